//! In-process model of the host design canvas.
//!
//! The canvas is an arena of [`SceneNode`]s keyed by [`NodeId`], plus the host services the
//! transcoder talks to: images by content hash, a font book with explicit loading, color
//! variables grouped into collections, selection and viewport.

use std::collections::{BTreeMap, BTreeSet};

use sha2::Digest;

use crate::foundation::core::{Rgb, Rgba, Vector};
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::text::{DEFAULT_FONT_FAMILY, FontName};

pub(crate) mod node;
pub(crate) mod snapshot;
pub(crate) mod svg;

pub use node::{
    Mixed, NativeBlur, NativeEffect, NativeImage, NativeKind, NativeLayout, NativePaint,
    NativePaintKind, NativeRadii, NativeShadow, NativeSolid, NativeTextCase, NodeId, SceneNode,
    ShapeProps, StrokeWeights, TextProps, VectorGeometry,
};

const PAGE: u16 = 1;

/// Styles installed for the default family.
const DEFAULT_STYLES: [&str; 9] = [
    "Thin",
    "Extra Light",
    "Light",
    "Regular",
    "Medium",
    "Semi Bold",
    "Bold",
    "Extra Bold",
    "Black",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Vector,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Vector::new(0.0, 0.0),
            zoom: 1.0,
        }
    }
}

/// Faces the canvas can render, and the subset loaded so far.
#[derive(Clone, Debug)]
pub struct FontBook {
    available: BTreeSet<FontName>,
    loaded: BTreeSet<FontName>,
}

impl Default for FontBook {
    fn default() -> Self {
        let available = DEFAULT_STYLES
            .iter()
            .map(|style| FontName::new(DEFAULT_FONT_FAMILY, *style))
            .collect();
        Self {
            available,
            loaded: BTreeSet::new(),
        }
    }
}

impl FontBook {
    pub fn install(&mut self, font: FontName) {
        self.available.insert(font);
    }

    pub fn is_available(&self, font: &FontName) -> bool {
        self.available.contains(font)
    }

    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.loaded.contains(font)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableCollection {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorVariable {
    pub id: String,
    pub name: String,
    pub collection: String,
    pub value: Rgba,
}

#[derive(Clone, Debug, Default)]
struct VariableStore {
    collections: BTreeMap<String, VariableCollection>,
    variables: BTreeMap<String, ColorVariable>,
    next: u32,
}

impl VariableStore {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}:{}", self.next)
    }
}

#[derive(Clone, Debug)]
pub struct Canvas {
    nodes: BTreeMap<NodeId, SceneNode>,
    page: NodeId,
    next_index: u32,
    images: BTreeMap<String, Vec<u8>>,
    fonts: FontBook,
    variables: VariableStore,
    selection: Vec<NodeId>,
    viewport: Viewport,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        let page = NodeId::new(PAGE, 0);
        let mut root = SceneNode::new(NativeKind::Page);
        root.id = page;
        root.name = "Page 1".to_string();
        root.fills = Mixed::Value(Vec::new());
        let mut nodes = BTreeMap::new();
        nodes.insert(page, root);
        Self {
            nodes,
            page,
            next_index: 1,
            images: BTreeMap::new(),
            fonts: FontBook::default(),
            variables: VariableStore::default(),
            selection: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn page(&self) -> NodeId {
        self.page
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get(&self, id: NodeId) -> WorldviewResult<&SceneNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| WorldviewError::validation(format!("unknown node {id}")))
    }

    pub fn get_mut(&mut self, id: NodeId) -> WorldviewResult<&mut SceneNode> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| WorldviewError::validation(format!("unknown node {id}")))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and all of its descendants in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Insert a detached node of `kind` and return its id.
    pub fn create(&mut self, kind: NativeKind) -> NodeId {
        let id = NodeId::new(PAGE, self.next_index);
        self.next_index += 1;
        let mut node = SceneNode::new(kind);
        node.id = id;
        node.name = default_name(kind).to_string();
        self.nodes.insert(id, node);
        id
    }

    /// A frame starts with an opaque white fill.
    pub fn create_frame(&mut self) -> NodeId {
        let id = self.create(NativeKind::Frame);
        self.set_default_fill(id, Rgb::WHITE);
        id
    }

    /// A rectangle starts with a light grey fill.
    pub fn create_rectangle(&mut self) -> NodeId {
        let id = self.create(NativeKind::Rectangle);
        self.set_default_fill(id, GREY);
        id
    }

    pub fn create_ellipse(&mut self) -> NodeId {
        let id = self.create(NativeKind::Ellipse);
        self.set_default_fill(id, GREY);
        id
    }

    pub fn create_star(&mut self) -> NodeId {
        let id = self.create(NativeKind::Star);
        self.set_default_fill(id, GREY);
        id
    }

    pub fn create_polygon(&mut self) -> NodeId {
        let id = self.create(NativeKind::Polygon);
        self.set_default_fill(id, GREY);
        id
    }

    pub fn create_line(&mut self) -> NodeId {
        let id = self.create(NativeKind::Line);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.height = 0.0;
            node.strokes = vec![NativePaint::solid(Rgb::BLACK, 1.0)];
        }
        id
    }

    pub fn create_vector(&mut self) -> NodeId {
        self.create(NativeKind::Vector)
    }

    pub fn create_text(&mut self) -> NodeId {
        let id = self.create(NativeKind::Text);
        self.set_default_fill(id, Rgb::BLACK);
        id
    }

    pub fn create_component(&mut self) -> NodeId {
        let id = self.create(NativeKind::Component);
        self.set_default_fill(id, Rgb::WHITE);
        id
    }

    pub fn create_section(&mut self) -> NodeId {
        let id = self.create(NativeKind::Section);
        self.set_default_fill(id, Rgb::WHITE);
        id
    }

    pub fn create_boolean_operation(&mut self) -> NodeId {
        self.create(NativeKind::BooleanOperation)
    }

    fn set_default_fill(&mut self, id: NodeId, color: Rgb) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.fills = Mixed::Value(vec![NativePaint::solid(color, 1.0)]);
        }
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> WorldviewResult<()> {
        let parent_kind = self.get(parent)?.kind;
        if !parent_kind.accepts_children() {
            return Err(WorldviewError::validation(format!(
                "{parent_kind} node {parent} cannot have children"
            )));
        }
        self.get(child)?;
        if child == self.page || self.is_ancestor(child, parent) {
            return Err(WorldviewError::validation(format!(
                "cannot append {child} into its own subtree"
            )));
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Whether `id` exists and its parent chain reaches the page.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id) && self.is_ancestor(self.page, id)
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(&id).and_then(|n| n.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
    }

    /// Delete `id` and its subtree.
    pub fn remove(&mut self, id: NodeId) -> WorldviewResult<()> {
        if id == self.page {
            return Err(WorldviewError::validation("cannot remove the page"));
        }
        self.get(id)?;
        self.detach(id);
        for gone in self.subtree(id) {
            self.nodes.remove(&gone);
        }
        self.selection.retain(|s| self.nodes.contains_key(s));
        Ok(())
    }

    /// Wrap `members` in a new group appended to `parent`.
    pub fn group(&mut self, members: &[NodeId], parent: NodeId) -> WorldviewResult<NodeId> {
        if members.is_empty() {
            return Err(WorldviewError::validation(
                "grouping requires at least one node",
            ));
        }
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for member in members {
            let n = self.get(*member)?;
            let (x0, y0, x1, y1) = (n.x, n.y, n.x + n.width, n.y + n.height);
            bounds = Some(match bounds {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            });
        }
        let group = self.create(NativeKind::Group);
        self.append_child(parent, group)?;
        for member in members {
            self.append_child(group, *member)?;
        }
        if let (Some((x0, y0, x1, y1)), Some(node)) = (bounds, self.nodes.get_mut(&group)) {
            node.x = x0;
            node.y = y0;
            node.width = x1 - x0;
            node.height = y1 - y0;
        }
        Ok(group)
    }

    /// Detached instance of `component`, with a copy of its subtree.
    pub fn create_instance(&mut self, component: NodeId) -> WorldviewResult<NodeId> {
        let source = self.get(component)?.clone();
        if source.kind != NativeKind::Component {
            return Err(WorldviewError::validation(format!(
                "node {component} is a {}, not a COMPONENT",
                source.kind
            )));
        }
        let id = self.create(NativeKind::Instance);
        if let Some(node) = self.nodes.get_mut(&id) {
            let mut copy = source;
            copy.id = id;
            copy.kind = NativeKind::Instance;
            copy.parent = None;
            copy.children = Vec::new();
            copy.main_component = Some(component);
            *node = copy;
        }
        for child in self.children(component).to_vec() {
            let cloned = self.clone_subtree(child)?;
            self.append_child(id, cloned)?;
        }
        Ok(id)
    }

    fn clone_subtree(&mut self, id: NodeId) -> WorldviewResult<NodeId> {
        let source = self.get(id)?.clone();
        let copy = self.create(source.kind);
        if let Some(node) = self.nodes.get_mut(&copy) {
            *node = SceneNode {
                id: copy,
                parent: None,
                children: Vec::new(),
                ..source.clone()
            };
        }
        for child in source.children {
            let cloned = self.clone_subtree(child)?;
            self.append_child(copy, cloned)?;
        }
        Ok(copy)
    }

    pub fn resize(&mut self, id: NodeId, width: f64, height: f64) -> WorldviewResult<()> {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(WorldviewError::validation(format!(
                "invalid size {width}x{height} for node {id}"
            )));
        }
        let node = self.get_mut(id)?;
        node.width = width;
        node.height = height;
        Ok(())
    }

    /// Store encoded image bytes and return their content hash.
    pub fn create_image(&mut self, bytes: &[u8]) -> WorldviewResult<String> {
        image::guess_format(bytes)
            .map_err(|e| WorldviewError::asset(format!("unrecognized image data: {e}")))?;
        let hash = sha256_hex(bytes);
        self.images
            .entry(hash.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(hash)
    }

    pub fn image_bytes(&self, hash: &str) -> Option<&[u8]> {
        self.images.get(hash).map(Vec::as_slice)
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.images.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    pub fn load_font(&mut self, font: &FontName) -> WorldviewResult<()> {
        if !self.fonts.is_available(font) {
            return Err(WorldviewError::asset(format!(
                "font \"{} {}\" is not available",
                font.family, font.style
            )));
        }
        self.fonts.loaded.insert(font.clone());
        Ok(())
    }

    /// Text properties of `id`, editable only once the node's current font is loaded.
    pub fn text_mut(&mut self, id: NodeId) -> WorldviewResult<&mut TextProps> {
        let node = self.get(id)?;
        let props = node
            .text
            .as_ref()
            .ok_or_else(|| WorldviewError::validation(format!("node {id} is not a text node")))?;
        if let Mixed::Value(font) = &props.font_name
            && !self.fonts.is_loaded(font)
        {
            return Err(WorldviewError::validation(format!(
                "font \"{} {}\" must be loaded before editing node {id}",
                font.family, font.style
            )));
        }
        self.get_mut(id)?
            .text
            .as_mut()
            .ok_or_else(|| WorldviewError::validation(format!("node {id} is not a text node")))
    }

    pub fn set_font_name(&mut self, id: NodeId, font: FontName) -> WorldviewResult<()> {
        if !self.fonts.is_loaded(&font) {
            return Err(WorldviewError::validation(format!(
                "font \"{} {}\" must be loaded before use",
                font.family, font.style
            )));
        }
        let node = self.get_mut(id)?;
        let props = node
            .text
            .as_mut()
            .ok_or_else(|| WorldviewError::validation(format!("node {id} is not a text node")))?;
        props.font_name = Mixed::Value(font);
        Ok(())
    }

    pub fn collection_by_name(&self, name: &str) -> Option<&VariableCollection> {
        self.variables
            .collections
            .values()
            .find(|c| c.name == name)
    }

    pub fn create_collection(&mut self, name: &str) -> String {
        let id = self.variables.next_id("VariableCollectionId");
        self.variables.collections.insert(
            id.clone(),
            VariableCollection {
                id: id.clone(),
                name: name.to_string(),
            },
        );
        id
    }

    pub fn color_variable_by_name(&self, name: &str) -> Option<&ColorVariable> {
        self.variables.variables.values().find(|v| v.name == name)
    }

    pub fn create_color_variable(
        &mut self,
        name: &str,
        collection: &str,
        value: Rgba,
    ) -> WorldviewResult<String> {
        if !self.variables.collections.contains_key(collection) {
            return Err(WorldviewError::validation(format!(
                "unknown variable collection {collection}"
            )));
        }
        let id = self.variables.next_id("VariableID");
        self.variables.variables.insert(
            id.clone(),
            ColorVariable {
                id: id.clone(),
                name: name.to_string(),
                collection: collection.to_string(),
                value,
            },
        );
        Ok(id)
    }

    pub fn variable(&self, id: &str) -> Option<&ColorVariable> {
        self.variables.variables.get(id)
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Vec<NodeId>) {
        self.selection = selection;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Select `id` and zoom out to half scale around it.
    pub fn focus(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get(&id) {
            self.viewport.center = Vector::new(node.x + node.width / 2.0, node.y + node.height / 2.0);
        }
        self.selection = vec![id];
        self.viewport.zoom = 0.5;
    }
}

const GREY: Rgb = Rgb {
    r: 0.85,
    g: 0.85,
    b: 0.85,
};

fn default_name(kind: NativeKind) -> &'static str {
    match kind {
        NativeKind::Page => "Page",
        NativeKind::Section => "Section",
        NativeKind::Frame => "Frame",
        NativeKind::Group => "Group",
        NativeKind::Component => "Component",
        NativeKind::ComponentSet => "Component Set",
        NativeKind::Instance => "Instance",
        NativeKind::Rectangle => "Rectangle",
        NativeKind::Ellipse => "Ellipse",
        NativeKind::Polygon => "Polygon",
        NativeKind::Star => "Star",
        NativeKind::Line => "Line",
        NativeKind::Vector => "Vector",
        NativeKind::Text => "Text",
        NativeKind::BooleanOperation => "Union",
        NativeKind::Slice => "Slice",
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/mod.rs"]
mod tests;
