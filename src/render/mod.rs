//! Portable [`WorldviewNode`] trees back into native scene graphs.
//!
//! Drawing is strictly ordered: siblings are created in list order with an optional pacing
//! delay before every sibling after the first, and text is revealed word by word. Every created
//! node is recorded in an [`IdMapping`] so interactive links can be resolved once the whole batch
//! exists (see [`crate::link_reactions`]).
//!
//! A child that fails to draw is logged and skipped; its siblings still draw. Whatever it had
//! created is removed again and never enters the mapping.

pub(crate) mod pacing;
pub(crate) mod paint;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::canvas::{
    Canvas, Mixed, NativeEffect, NativeKind, NativeLayout, NativePaint, NativeShadow,
    NativeTextCase, NodeId, SceneNode, StrokeWeights, VectorGeometry,
};
use crate::foundation::core::{Origin, Vector};
use crate::foundation::error::WorldviewResult;
use crate::link::{LinkReport, link_reactions};
use crate::model::document::Assets;
use crate::model::effect::Effect;
use crate::model::layout::{CornerRadii, CounterAxisAlign, EdgeWeights, Layout, PrimaryAxisAlign};
use crate::model::node::{
    BooleanOperationNode, ContainerNode, EllipseNode, GroupNode, IconContainerNode, LineNode,
    NodeBase, PolygonNode, StarNode, TextNode, VectorNode, VoidContainerNode, WorldviewNode,
};
use crate::model::paint::Paint;
use crate::model::text::{DEFAULT_FONT_FAMILY, FontName, TextCase, style_for_weight};
use crate::model::value::Indirect;

use self::pacing::{sibling_delay, word_delay};
use self::paint::{resolve_paint, resolve_text};

pub use self::pacing::{NoPacing, Pacer, RecordingPacer, TokioPacer};

/// Horizontal gap between roots drawn side by side.
pub const ROOT_GAP: f64 = 16.0;

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Delay before each sibling after the first; words wait a quarter of it. `0` disables pacing.
    pub pacing_delay_ms: u64,
    /// Binding table from theme keys to canvas handles, when themed values should be upgraded.
    pub assets: Option<Assets>,
}

/// Extraction id to native id, scoped to one render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdMapping(BTreeMap<String, NodeId>);

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, extracted: impl Into<String>, native: NodeId) {
        self.0.insert(extracted.into(), native);
    }

    pub fn get(&self, extracted: &str) -> Option<NodeId> {
        self.0.get(extracted).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn remove(&mut self, extracted: &str) -> Option<NodeId> {
        self.0.remove(extracted)
    }

    /// Keep only the entries whose native id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.0.retain(|_, v| keep(*v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Native id to extraction id.
    pub fn inverse(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (v.to_string(), k.clone()))
            .collect()
    }
}

/// What a render pass created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOutcome {
    /// Native ids of the roots that drew, in input order.
    pub roots: Vec<NodeId>,
    pub ids: IdMapping,
    pub link: LinkReport,
}

type Drawn<'f> = Pin<Box<dyn Future<Output = WorldviewResult<NodeId>> + 'f>>;

/// Draws nodes into a canvas, recording every created id.
pub struct Renderer<'a> {
    canvas: &'a mut Canvas,
    settings: &'a RenderSettings,
    pacer: &'a dyn Pacer,
    ids: IdMapping,
    /// Nodes created but not yet finished, keyed by extraction id.
    pending: IdMapping,
}

impl<'a> Renderer<'a> {
    pub fn new(canvas: &'a mut Canvas, settings: &'a RenderSettings, pacer: &'a dyn Pacer) -> Self {
        Self {
            canvas,
            settings,
            pacer,
            ids: IdMapping::new(),
            pending: IdMapping::new(),
        }
    }

    pub fn ids(&self) -> &IdMapping {
        &self.ids
    }

    pub fn into_ids(self) -> IdMapping {
        self.ids
    }

    /// Draw `node` and its subtree under `parent` and return the new native id.
    ///
    /// The id is recorded only once the node is on the canvas; on failure the partial node is
    /// removed.
    pub fn draw<'f>(&'f mut self, node: &'f WorldviewNode, parent: NodeId) -> Drawn<'f> {
        Box::pin(async move {
            tracing::debug!(node = node.id(), kind = %node.kind(), "drawing");
            let drawn = self.draw_kind(node, parent).await;
            let created = self.pending.remove(node.id());
            match drawn {
                Ok(id) => {
                    self.ids.insert(node.id(), id);
                    Ok(id)
                }
                Err(e) => {
                    if let Some(orphan) = created {
                        self.discard(orphan);
                    }
                    Err(e)
                }
            }
        })
    }

    /// Delete a node that failed to finish, and forget any descendants already mapped.
    fn discard(&mut self, id: NodeId) {
        if let Err(e) = self.canvas.remove(id) {
            tracing::debug!(%id, "cannot remove partial node: {e}");
        }
        let canvas = &*self.canvas;
        self.ids.retain(|native| canvas.node(native).is_some());
    }

    async fn draw_kind(&mut self, node: &WorldviewNode, parent: NodeId) -> WorldviewResult<NodeId> {
        match node {
            WorldviewNode::Container(n) => self.draw_container(n, parent, false).await,
            WorldviewNode::Instance(n) => self.draw_container(n, parent, true).await,
            WorldviewNode::Group(n) => self.draw_group(n, parent).await,
            WorldviewNode::VoidContainer(n) => self.draw_void_container(n, parent),
            WorldviewNode::IconContainer(n) => self.draw_icon(n, parent),
            WorldviewNode::Text(n) => self.draw_text(n, parent).await,
            WorldviewNode::Vector(n) => self.draw_vector(n, parent),
            WorldviewNode::Ellipse(n) => self.draw_ellipse(n, parent),
            WorldviewNode::BooleanOperation(n) => self.draw_boolean_operation(n, parent).await,
            WorldviewNode::Line(n) => self.draw_line(n, parent),
            WorldviewNode::Star(n) => self.draw_star(n, parent),
            WorldviewNode::Polygon(n) => self.draw_polygon(n, parent),
        }
    }

    async fn draw_children(
        &mut self,
        children: Option<&[WorldviewNode]>,
        parent: NodeId,
        paced: bool,
    ) {
        let delay = sibling_delay(self.settings.pacing_delay_ms).filter(|_| paced);
        for (i, child) in children.unwrap_or_default().iter().enumerate() {
            if i > 0
                && let Some(delay) = delay
            {
                self.pacer.pause(delay).await;
            }
            if let Err(e) = self.draw(child, parent).await {
                tracing::warn!(node = child.id(), kind = %child.kind(), "skipping child: {e}");
            }
        }
    }

    async fn draw_container(
        &mut self,
        n: &ContainerNode,
        parent: NodeId,
        instance: bool,
    ) -> WorldviewResult<NodeId> {
        let id = if instance {
            self.canvas.create(NativeKind::Instance)
        } else {
            self.canvas.create_frame()
        };
        self.place(id, &n.base)?;
        let node = self.canvas.get_mut(id)?;
        node.fills = Mixed::Value(Vec::new());
        apply_layout(&mut node.layout, &n.layout);
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_edge_stroke(id, n.stroke.as_ref(), &n.edges)?;
        apply_radii(self.canvas.get_mut(id)?, &n.radii);
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        self.draw_children(n.children.as_deref(), id, true).await;
        Ok(id)
    }

    /// Groups need a member to exist, so a hidden placeholder holds the group open until the
    /// real children are in.
    async fn draw_group(&mut self, n: &GroupNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let placeholder = self.canvas.create_rectangle();
        self.canvas.get_mut(placeholder)?.visible = false;
        let id = match self.canvas.group(&[placeholder], parent) {
            Ok(id) => id,
            Err(e) => {
                self.discard(placeholder);
                return Err(e);
            }
        };
        self.place(id, &n.base)?;
        self.apply_effects(id, &n.base)?;
        self.draw_children(n.children.as_deref(), id, true).await;
        self.canvas.remove(placeholder)?;
        Ok(id)
    }

    fn draw_void_container(
        &mut self,
        n: &VoidContainerNode,
        parent: NodeId,
    ) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_rectangle();
        self.place(id, &n.base)?;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_edge_stroke(id, n.stroke.as_ref(), &n.edges)?;
        apply_radii(self.canvas.get_mut(id)?, &n.radii);
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    /// Re-import the markup, then paint every descendant that takes paint.
    fn draw_icon(&mut self, n: &IconContainerNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_node_from_svg(resolve_text(&n.data))?;
        self.place(id, &n.base)?;
        let node = self.canvas.get_mut(id)?;
        node.fills = Mixed::Value(Vec::new());
        node.set_stroke_weight(n.stroke_weight.unwrap_or(0.0));

        let fill = n.fill.as_ref().map(|f| self.paint(f));
        let stroke = match (&n.stroke, n.stroke_weight) {
            (Some(s), Some(weight)) => Some((self.paint(s), weight)),
            _ => None,
        };
        for descendant in self.canvas.subtree(id).into_iter().skip(1) {
            let node = self.canvas.get_mut(descendant)?;
            if let Some(fill) = &fill
                && node.kind.has_fills()
            {
                node.fills = Mixed::Value(fill.clone());
            }
            if let Some((stroke, weight)) = &stroke
                && node.kind.has_strokes()
            {
                node.strokes = stroke.clone();
                node.set_stroke_weight(*weight);
            }
        }
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    async fn draw_text(&mut self, n: &TextNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_text();
        self.place(id, &n.base)?;
        self.apply_fill(id, n.fill.as_ref())?;

        let font = self.load_font(n)?;
        self.canvas.set_font_name(id, font)?;
        let props = self.canvas.text_mut(id)?;
        props.font_size = Mixed::Value(n.font_size);
        props.font_weight = Mixed::Value(n.font_weight);
        props.letter_spacing = Mixed::Value(n.letter_spacing);
        props.line_height = Mixed::Value(n.line_height);
        props.text_align_horizontal = n.text_align_horizontal;
        props.text_align_vertical = n.text_align_vertical;
        props.text_case = Mixed::Value(match n.text_case {
            TextCase::Original => NativeTextCase::Original,
            TextCase::Upper => NativeTextCase::Upper,
            TextCase::Lower => NativeTextCase::Lower,
        });
        props.text_truncation = n.truncation;
        props.characters.clear();

        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;

        let delay = word_delay(self.settings.pacing_delay_ms);
        for (i, word) in resolve_text(&n.characters).split(' ').enumerate() {
            if i > 0 {
                if let Some(delay) = delay {
                    self.pacer.pause(delay).await;
                }
                self.canvas.text_mut(id)?.characters.push(' ');
            }
            self.canvas.text_mut(id)?.characters.push_str(word);
        }
        Ok(id)
    }

    /// The requested face, or the default family at the nearest named weight.
    fn load_font(&mut self, n: &TextNode) -> WorldviewResult<FontName> {
        match self.canvas.load_font(&n.font_name) {
            Ok(()) => Ok(n.font_name.clone()),
            Err(e) => {
                let fallback = FontName::new(DEFAULT_FONT_FAMILY, style_for_weight(n.font_weight));
                tracing::warn!(
                    node = %n.base.id,
                    family = %fallback.family,
                    style = %fallback.style,
                    "{e}, falling back"
                );
                self.canvas.load_font(&fallback)?;
                Ok(fallback)
            }
        }
    }

    fn draw_vector(&mut self, n: &VectorNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_vector();
        self.place(id, &n.base)?;
        self.canvas.get_mut(id)?.vector = Some(VectorGeometry {
            vector_network: n.vector_network.clone(),
            vector_paths: n.vector_paths.clone(),
        });
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_stroke(id, n.stroke.as_ref(), n.stroke_weight)?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    fn draw_ellipse(&mut self, n: &EllipseNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_ellipse();
        self.place(id, &n.base)?;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_stroke(id, n.stroke.as_ref(), n.stroke_weight)?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    async fn draw_boolean_operation(
        &mut self,
        n: &BooleanOperationNode,
        parent: NodeId,
    ) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_boolean_operation();
        self.place(id, &n.base)?;
        self.canvas.get_mut(id)?.shape.boolean_operation = n.boolean_operation;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        // Operands are drawn back to back.
        self.draw_children(n.children.as_deref(), id, false).await;
        Ok(id)
    }

    fn draw_line(&mut self, n: &LineNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_line();
        self.place(id, &n.base)?;
        self.canvas.get_mut(id)?.rotation = n.rotation;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_stroke(id, n.stroke.as_ref(), n.stroke_weight)?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    fn draw_star(&mut self, n: &StarNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_star();
        self.place(id, &n.base)?;
        let node = self.canvas.get_mut(id)?;
        node.rotation = n.rotation;
        node.shape.point_count = n.count;
        node.shape.inner_radius = n.ratio;
        node.shape.corner_radius = n.corner_radius;
        node.shape.corner_smoothing = n.corner_smoothing;
        node.shape.constrain_proportions = n.constrain_proportions;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_stroke(id, n.stroke.as_ref(), n.stroke_weight)?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    fn draw_polygon(&mut self, n: &PolygonNode, parent: NodeId) -> WorldviewResult<NodeId> {
        let id = self.canvas.create_polygon();
        self.place(id, &n.base)?;
        let node = self.canvas.get_mut(id)?;
        node.rotation = n.rotation;
        node.shape.point_count = n.count;
        node.shape.corner_radius = n.corner_radius;
        node.shape.corner_smoothing = n.corner_smoothing;
        node.shape.constrain_proportions = n.constrain_proportions;
        self.apply_fill(id, n.fill.as_ref())?;
        self.apply_stroke(id, n.stroke.as_ref(), n.stroke_weight)?;
        self.apply_effects(id, &n.base)?;
        self.canvas.append_child(parent, id)?;
        Ok(id)
    }

    /// Move a drawn root to its slot; empty group dimensions are bumped to one unit.
    fn position_root(
        &mut self,
        id: NodeId,
        root: &WorldviewNode,
        x: f64,
        y: f64,
    ) -> WorldviewResult<()> {
        if let WorldviewNode::Group(g) = root {
            let bump = |v: f64| if v == 0.0 { v + 1.0 } else { v };
            self.canvas
                .resize(id, bump(g.base.width), bump(g.base.height))?;
        }
        let node = self.canvas.get_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Mark the node as in progress, then copy name, position and size.
    fn place(&mut self, id: NodeId, base: &NodeBase) -> WorldviewResult<()> {
        self.pending.insert(base.id.clone(), id);
        let node = self.canvas.get_mut(id)?;
        node.name = base.name.clone();
        node.x = base.x;
        node.y = base.y;
        self.canvas.resize(id, base.width, base.height)
    }

    fn paint(&mut self, field: &Indirect<Paint>) -> Vec<NativePaint> {
        resolve_paint(self.canvas, field, self.settings.assets.as_ref())
    }

    /// Replace the creation-time fill; `None` leaves the node unfilled.
    fn apply_fill(&mut self, id: NodeId, fill: Option<&Indirect<Paint>>) -> WorldviewResult<()> {
        let stack = fill.map(|f| self.paint(f)).unwrap_or_default();
        self.canvas.get_mut(id)?.fills = Mixed::Value(stack);
        Ok(())
    }

    fn apply_stroke(
        &mut self,
        id: NodeId,
        stroke: Option<&Indirect<Paint>>,
        weight: Option<f64>,
    ) -> WorldviewResult<()> {
        let strokes = stroke.map(|s| self.paint(s)).unwrap_or_default();
        let node = self.canvas.get_mut(id)?;
        node.strokes = strokes;
        node.set_stroke_weight(weight.unwrap_or(0.0));
        Ok(())
    }

    /// Per-edge strokes are applied only when some edge weight is set; unset edges get zero.
    fn apply_edge_stroke(
        &mut self,
        id: NodeId,
        stroke: Option<&Indirect<Paint>>,
        edges: &EdgeWeights,
    ) -> WorldviewResult<()> {
        let Some(stroke) = stroke.filter(|_| edges.any_set()) else {
            return Ok(());
        };
        let strokes = self.paint(stroke);
        let node = self.canvas.get_mut(id)?;
        node.stroke_weights = StrokeWeights {
            top: edges.stroke_top_weight.unwrap_or(0.0),
            right: edges.stroke_right_weight.unwrap_or(0.0),
            bottom: edges.stroke_bottom_weight.unwrap_or(0.0),
            left: edges.stroke_left_weight.unwrap_or(0.0),
        };
        node.strokes = strokes;
        Ok(())
    }

    fn apply_effects(&mut self, id: NodeId, base: &NodeBase) -> WorldviewResult<()> {
        let effects = native_effects(base.effects.as_deref());
        if !effects.is_empty() {
            self.canvas.get_mut(id)?.effects = effects;
        }
        Ok(())
    }
}

fn apply_layout(native: &mut NativeLayout, layout: &Layout) {
    native.layout_mode = layout.layout_mode.unwrap_or_default();
    native.layout_positioning = layout.layout_positioning.unwrap_or_default();
    native.primary_axis_align_items = layout
        .primary_axis_align_items
        .unwrap_or(PrimaryAxisAlign::Center);
    native.counter_axis_align_items = layout
        .counter_axis_align_items
        .unwrap_or(CounterAxisAlign::Center);
    native.padding_top = layout.padding_top.unwrap_or(0.0);
    native.padding_bottom = layout.padding_bottom.unwrap_or(0.0);
    native.padding_left = layout.padding_left.unwrap_or(0.0);
    native.padding_right = layout.padding_right.unwrap_or(0.0);
    native.item_spacing = layout.item_spacing.unwrap_or(0.0);
}

fn apply_radii(node: &mut SceneNode, radii: &CornerRadii) {
    let r = &mut node.corner_radii;
    if let Some(v) = radii.top_left_radius {
        r.top_left = v;
    }
    if let Some(v) = radii.top_right_radius {
        r.top_right = v;
    }
    if let Some(v) = radii.bottom_left_radius {
        r.bottom_left = v;
    }
    if let Some(v) = radii.bottom_right_radius {
        r.bottom_right = v;
    }
}

/// Shadows drawn visible with normal blending.
fn native_effects(effects: Option<&[Effect]>) -> Vec<NativeEffect> {
    effects
        .unwrap_or_default()
        .iter()
        .map(|effect| {
            let s = effect.shadow();
            let shadow = NativeShadow {
                color: s.color,
                offset: s.offset,
                radius: s.radius,
                spread: s.spread,
                visible: true,
                blend_mode: "NORMAL".to_string(),
            };
            match effect {
                Effect::DropShadow(_) => NativeEffect::DropShadow(shadow),
                Effect::InnerShadow(_) => NativeEffect::InnerShadow(shadow),
            }
        })
        .collect()
}

/// Top-left corner for a row of roots centered on `center`.
///
/// The row is as wide as every root plus [`ROOT_GAP`] between neighbours and as tall as the
/// first root. Both coordinates are truncated toward zero.
pub fn root_origin(center: Vector, roots: &[WorldviewNode]) -> Origin {
    let widths: f64 = roots.iter().map(|r| r.base().width).sum();
    let gaps = ROOT_GAP * roots.len().saturating_sub(1) as f64;
    let first_height = roots.first().map_or(0.0, |r| r.base().height);
    Origin {
        x: (center.x - (widths + gaps) / 2.0).trunc(),
        y: (center.y - first_height / 2.0).trunc(),
    }
}

/// Draw `node` under `parent`, then resolve links within its subtree.
#[tracing::instrument(skip_all, fields(node = node.id()))]
pub async fn draw_node(
    canvas: &mut Canvas,
    node: &WorldviewNode,
    parent: NodeId,
    settings: &RenderSettings,
    pacer: &dyn Pacer,
) -> WorldviewResult<RenderOutcome> {
    let mut renderer = Renderer::new(canvas, settings, pacer);
    let id = renderer.draw(node, parent).await?;
    let ids = renderer.into_ids();
    let link = link_reactions(canvas, std::slice::from_ref(node), &ids);
    Ok(RenderOutcome {
        roots: vec![id],
        ids,
        link,
    })
}

/// Draw `roots` side by side around the viewport center, then resolve links across all of them.
///
/// A root that fails to draw is logged and skipped; its slot in the row stays reserved.
#[tracing::instrument(skip_all, fields(roots = roots.len()))]
pub async fn draw_roots(
    canvas: &mut Canvas,
    roots: &[WorldviewNode],
    settings: &RenderSettings,
    pacer: &dyn Pacer,
) -> RenderOutcome {
    let origin = root_origin(canvas.viewport().center, roots);
    let page = canvas.page();
    let mut renderer = Renderer::new(canvas, settings, pacer);
    let mut drawn = Vec::with_capacity(roots.len());
    let mut x = origin.x;
    for (i, root) in roots.iter().enumerate() {
        if i > 0 {
            x += ROOT_GAP;
        }
        let placed = match renderer.draw(root, page).await {
            Ok(id) => match renderer.position_root(id, root, x, origin.y) {
                Ok(()) => Ok(id),
                Err(e) => {
                    renderer.ids.remove(root.id());
                    renderer.discard(id);
                    Err(e)
                }
            },
            Err(e) => Err(e),
        };
        match placed {
            Ok(id) => drawn.push(id),
            Err(e) => tracing::warn!(node = root.id(), "skipping root: {e}"),
        }
        x += root.base().width;
    }
    let ids = renderer.into_ids();
    let link = link_reactions(canvas, roots, &ids);
    tracing::debug!(
        drawn = drawn.len(),
        linked = link.resolved,
        dropped = link.dropped,
        "roots drawn"
    );
    RenderOutcome {
        roots: drawn,
        ids,
        link,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mod.rs"]
mod tests;
