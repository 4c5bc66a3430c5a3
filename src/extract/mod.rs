//! Native scene graph to portable [`WorldviewNode`] trees.
//!
//! Extraction is strict: a `MIXED` value where one determinate value is needed, an image paint
//! without a hash, or an unsupported node kind aborts the whole walk with an
//! [`ExtractError`](crate::ExtractError) naming the offending native node. Lossy but harmless
//! conditions, such as an unsupported text case, are collected as [`ExtractWarning`]s instead.
//!
//! Container extraction normalizes the native source: every container is resized so it covers
//! the bounding box of its children.

pub(crate) mod paint;

use crate::canvas::{Canvas, Mixed, NativeKind, NativeTextCase, NodeId, SceneNode};
use crate::foundation::error::{ExtractError, ExtractErrorKind, WorldviewResult};
use crate::model::layout::{CornerRadii, EdgeWeights, Layout};
use crate::model::node::{
    BooleanOperationNode, ContainerNode, EllipseNode, GroupNode, IconContainerNode, LineNode,
    NodeBase, PolygonNode, StarNode, TextNode, VectorNode, VoidContainerNode, WorldviewNode,
};
use crate::model::paint::Paint;
use crate::model::text::TextCase;
use crate::model::value::Indirect;

use self::paint::{
    effects_of, find_solid_fill, find_solid_stroke, paint_from_fills, reactions_of,
    solid_from_fills, solid_from_strokes, stroke_weight_of,
};

/// Frame-like nodes up to this size (in both dimensions) with children become icons.
pub const ICON_MAX_SIZE: f64 = 64.0;

const MIN_CONTAINER_SIZE: f64 = 0.01;
const MIN_VECTOR_SIZE: f64 = 0.1;
const FALLBACK_FONT_SIZE: f64 = 16.0;
const FALLBACK_FONT_WEIGHT: u32 = 400;

/// Non-fatal extraction finding.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractWarning {
    pub node: NodeId,
    pub message: String,
}

/// Walks a canvas subtree and builds the portable tree.
///
/// Holds the canvas mutably: containers are resized to fit their content and icon export
/// briefly toggles child visibility.
pub struct Extractor<'a> {
    canvas: &'a mut Canvas,
    warnings: Vec<ExtractWarning>,
}

/// Extract one native node, discarding warnings.
pub fn extract_node(canvas: &mut Canvas, id: NodeId) -> WorldviewResult<WorldviewNode> {
    Extractor::new(canvas).extract(id)
}

/// Whether a frame-like node is small enough, and has content, to be exported as an icon.
pub fn is_icon_like(node: &SceneNode) -> bool {
    node.width.trunc() <= ICON_MAX_SIZE
        && node.height.trunc() <= ICON_MAX_SIZE
        && !node.children.is_empty()
}

impl<'a> Extractor<'a> {
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self {
            canvas,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ExtractWarning> {
        self.warnings
    }

    fn warn(&mut self, node: NodeId, message: String) {
        tracing::warn!(node = %node, "{message}");
        self.warnings.push(ExtractWarning { node, message });
    }

    pub fn extract(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let node = self.canvas.get(id)?;
        match node.kind {
            NativeKind::Frame
            | NativeKind::Component
            | NativeKind::ComponentSet
            | NativeKind::Instance => {
                if is_icon_like(node) {
                    self.extract_icon(id)
                } else {
                    self.extract_container(id)
                }
            }
            NativeKind::Rectangle => self.extract_void_container(id),
            NativeKind::Ellipse => self.extract_ellipse(id),
            NativeKind::Star => self.extract_star(id),
            NativeKind::Polygon => self.extract_polygon(id),
            NativeKind::BooleanOperation => self.extract_boolean_operation(id),
            NativeKind::Line => self.extract_line(id),
            NativeKind::Text => self.extract_text(id),
            NativeKind::Vector => self.extract_vector(id),
            NativeKind::Group => self.extract_group(id),
            kind @ (NativeKind::Page | NativeKind::Section | NativeKind::Slice) => {
                Err(ExtractError::new(id, ExtractErrorKind::UnsupportedKind(kind)).into())
            }
        }
    }

    /// Extract visible children in order; `None` when none are visible.
    fn extract_children(&mut self, id: NodeId) -> WorldviewResult<Option<Vec<WorldviewNode>>> {
        let ids = self.canvas.children(id).to_vec();
        let mut out = Vec::with_capacity(ids.len());
        for child in ids {
            if !self.canvas.get(child)?.visible {
                continue;
            }
            out.push(self.extract(child)?);
        }
        Ok((!out.is_empty()).then_some(out))
    }

    pub fn extract_container(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let node = self.canvas.get(id)?;
        let l = &node.layout;
        let layout = Layout {
            padding_top: positive(l.padding_top),
            padding_bottom: positive(l.padding_bottom),
            padding_left: positive(l.padding_left),
            padding_right: positive(l.padding_right),
            layout_mode: Some(l.layout_mode),
            layout_positioning: Some(l.layout_positioning),
            primary_axis_align_items: Some(l.primary_axis_align_items),
            counter_axis_align_items: Some(l.counter_axis_align_items),
            item_spacing: Some(l.item_spacing),
        };
        let fill = paint_from_fills(node)?;
        let (stroke, edges) = edge_stroke(node);
        let mut base = base_of(node);
        base.width = normalized(node.width);
        base.height = normalized(node.height);
        let instance = node.kind == NativeKind::Instance;

        let (width, height) = self.fit_to_content(id, base.width, base.height)?;
        base.width = width;
        base.height = height;

        let container = ContainerNode {
            base,
            layout,
            fill: fill.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            edges,
            radii: radii_of(self.canvas.get(id)?),
            children: self.extract_children(id)?,
        };
        Ok(if instance {
            WorldviewNode::Instance(container)
        } else {
            WorldviewNode::Container(container)
        })
    }

    /// Grow the native node to cover every child's box and return the new size.
    fn fit_to_content(
        &mut self,
        id: NodeId,
        width: f64,
        height: f64,
    ) -> WorldviewResult<(f64, f64)> {
        let mut right = width;
        let mut bottom = height;
        for child in self.canvas.children(id) {
            let c = self.canvas.get(*child)?;
            right = right.max(c.x + c.width);
            bottom = bottom.max(c.y + c.height);
        }
        let node = self.canvas.get(id)?;
        if right != node.width || bottom != node.height {
            tracing::debug!(
                node = %id,
                width = right,
                height = bottom,
                "resizing container to fit content"
            );
            self.canvas.resize(id, right, bottom)?;
        }
        Ok((right, bottom))
    }

    fn extract_void_container(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let node = self.canvas.get(id)?;
        let fill = paint_from_fills(node)?;
        let (stroke, edges) = edge_stroke(node);
        Ok(WorldviewNode::VoidContainer(VoidContainerNode {
            base: base_of(node),
            fill: fill.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            edges,
            radii: radii_of(node),
        }))
    }

    fn extract_icon(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let fill = find_solid_fill(self.canvas, id)?;
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        let base = base_of(node);
        // A mixed weight on an icon is not fatal; the icon just carries none.
        let stroke_weight = match node.stroke_weight() {
            Mixed::Value(w) if w > 0.0 => Some(w),
            _ => None,
        };
        let data = self.export_icon_markup(id)?;
        Ok(WorldviewNode::IconContainer(IconContainerNode {
            base,
            fill: fill.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight,
            data: Indirect::Value(data),
        }))
    }

    /// Export with every direct child shown and clipping off, then restore both.
    fn export_icon_markup(&mut self, id: NodeId) -> WorldviewResult<String> {
        let children = self.canvas.children(id).to_vec();
        let mut shown = Vec::with_capacity(children.len());
        for child in &children {
            let node = self.canvas.get_mut(*child)?;
            shown.push(node.visible);
            node.visible = true;
        }
        let clips = std::mem::replace(&mut self.canvas.get_mut(id)?.clips_content, false);

        let exported = self.canvas.export_svg(id);

        for (child, visible) in children.iter().zip(shown) {
            self.canvas.get_mut(*child)?.visible = visible;
        }
        self.canvas.get_mut(id)?.clips_content = clips;

        let markup = exported
            .map_err(|e| ExtractError::new(id, ExtractErrorKind::SvgExport(e.to_string())))?;
        Ok(markup)
    }

    fn extract_ellipse(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        Ok(WorldviewNode::Ellipse(EllipseNode {
            base: base_of(node),
            fill: paint_from_fills(node)?.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight: stroke_weight_of(node)?,
        }))
    }

    fn extract_line(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        Ok(WorldviewNode::Line(LineNode {
            base: base_of(node),
            rotation: node.rotation,
            fill: paint_from_fills(node)?.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight: stroke_weight_of(node)?,
        }))
    }

    fn extract_star(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        let shape = &node.shape;
        Ok(WorldviewNode::Star(StarNode {
            base: base_of(node),
            rotation: node.rotation,
            corner_radius: shape.corner_radius,
            count: shape.point_count,
            ratio: shape.inner_radius,
            corner_smoothing: shape.corner_smoothing,
            constrain_proportions: shape.constrain_proportions,
            fill: paint_from_fills(node)?.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight: stroke_weight_of(node)?,
        }))
    }

    fn extract_polygon(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        let shape = &node.shape;
        Ok(WorldviewNode::Polygon(PolygonNode {
            base: base_of(node),
            rotation: node.rotation,
            corner_radius: shape.corner_radius,
            count: shape.point_count,
            corner_smoothing: shape.corner_smoothing,
            constrain_proportions: shape.constrain_proportions,
            fill: paint_from_fills(node)?.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight: stroke_weight_of(node)?,
        }))
    }

    pub fn extract_boolean_operation(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let node = self.canvas.get(id)?;
        let base = base_of(node);
        let fill = paint_from_fills(node)?;
        let boolean_operation = node.shape.boolean_operation;
        Ok(WorldviewNode::BooleanOperation(BooleanOperationNode {
            base,
            fill: fill.map(Indirect::Value),
            boolean_operation,
            children: self.extract_children(id)?,
        }))
    }

    fn extract_group(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let base = base_of(self.canvas.get(id)?);
        Ok(WorldviewNode::Group(GroupNode {
            base,
            children: self.extract_children(id)?,
        }))
    }

    fn extract_vector(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let fill = find_solid_fill(self.canvas, id)?;
        let stroke = find_solid_stroke(self.canvas, id)?;
        let node = self.canvas.get(id)?;
        let mut base = base_of(node);
        base.width = base.width.max(MIN_VECTOR_SIZE);
        base.height = base.height.max(MIN_VECTOR_SIZE);
        let geometry = node.vector.clone().unwrap_or_default();
        Ok(WorldviewNode::Vector(VectorNode {
            base,
            fill: fill.map(Indirect::Value),
            stroke: stroke.map(Indirect::Value),
            stroke_weight: stroke_weight_of(node)?,
            vector_network: geometry.vector_network,
            vector_paths: geometry.vector_paths,
        }))
    }

    fn extract_text(&mut self, id: NodeId) -> WorldviewResult<WorldviewNode> {
        let node = self.canvas.get(id)?;
        let base = base_of(node);
        let fill = solid_from_fills(node);
        let text = node.text.clone().unwrap_or_default();

        let text_case = match text.text_case {
            Mixed::Value(NativeTextCase::Original) => TextCase::Original,
            Mixed::Value(NativeTextCase::Upper) => TextCase::Upper,
            Mixed::Value(NativeTextCase::Lower) => TextCase::Lower,
            Mixed::Value(other @ (NativeTextCase::Title
            | NativeTextCase::SmallCaps
            | NativeTextCase::SmallCapsForced)) => {
                self.warn(id, format!("unsupported text case: {other:?}"));
                TextCase::Original
            }
            Mixed::Mixed => TextCase::Original,
        };

        Ok(WorldviewNode::Text(TextNode {
            base,
            fill: fill.map(Indirect::Value),
            font_name: text.font_name.value().cloned().unwrap_or_default(),
            font_size: text
                .font_size
                .value()
                .copied()
                .unwrap_or(FALLBACK_FONT_SIZE),
            font_weight: text
                .font_weight
                .value()
                .copied()
                .unwrap_or(FALLBACK_FONT_WEIGHT),
            letter_spacing: text.letter_spacing.value().copied().unwrap_or_default(),
            line_height: text.line_height.value().copied().unwrap_or_default(),
            text_align_horizontal: text.text_align_horizontal,
            text_align_vertical: text.text_align_vertical,
            text_case,
            characters: Indirect::Value(text.characters),
            truncation: text.text_truncation,
        }))
    }
}

fn base_of(node: &SceneNode) -> NodeBase {
    NodeBase {
        effects: effects_of(node),
        reaction: reactions_of(node),
        ..NodeBase::new(node.id.to_string(), node.name.clone())
            .at(node.x, node.y)
            .sized(node.width, node.height)
    }
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

fn normalized(v: f64) -> f64 {
    if v == 0.0 { MIN_CONTAINER_SIZE } else { v }
}

/// Stroke paint and per-edge weights, kept only when some edge has a positive weight.
fn edge_stroke(node: &SceneNode) -> (Option<Paint>, EdgeWeights) {
    let w = &node.stroke_weights;
    let edges = EdgeWeights {
        stroke_top_weight: positive(w.top),
        stroke_bottom_weight: positive(w.bottom),
        stroke_left_weight: positive(w.left),
        stroke_right_weight: positive(w.right),
    };
    match solid_from_strokes(node) {
        Some(stroke) if edges.any_set() => (Some(stroke), edges),
        _ => (None, EdgeWeights::default()),
    }
}

fn radii_of(node: &SceneNode) -> CornerRadii {
    let r = &node.corner_radii;
    CornerRadii {
        top_left_radius: positive(r.top_left),
        top_right_radius: positive(r.top_right),
        bottom_left_radius: positive(r.bottom_left),
        bottom_right_radius: positive(r.bottom_right),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/extract/mod.rs"]
mod tests;
