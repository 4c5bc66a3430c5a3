//! SVG export and import for canvas subtrees.
//!
//! Export draws kurbo geometry for every visible node under the root and serializes it with
//! `BezPath::to_svg`. Import parses markup with `usvg` and rebuilds it as a frame of vector
//! children carrying the markup's solid fills and strokes.

use std::f64::consts::PI;
use std::fmt::Write as _;

use kurbo::{Ellipse, RoundedRect, RoundedRectRadii, Shape};

use crate::canvas::node::{Mixed, NativeKind, NativePaint, NodeId, SceneNode, VectorGeometry};
use crate::canvas::Canvas;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgb, channel_byte};
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::vector::{VectorPath, WindingRule};

const TOLERANCE: f64 = 0.1;

impl Canvas {
    /// Export the visible subtree of `id` as an SVG document in the node's local space.
    pub fn export_svg(&self, id: NodeId) -> WorldviewResult<String> {
        let root = self.get(id)?;
        let mut body = String::new();
        let mut defs = String::new();

        draw_paint(&mut body, root, local_shape(root, Affine::IDENTITY));
        let children = self.export_children(root, Affine::IDENTITY)?;
        if root.clips_content && !children.is_empty() {
            let clip = format!("clip_{}_{}", id.page(), id.index());
            let _ = write!(
                defs,
                "<clipPath id=\"{clip}\"><rect width=\"{}\" height=\"{}\"/></clipPath>",
                root.width, root.height
            );
            let _ = write!(body, "<g clip-path=\"url(#{clip})\">{children}</g>");
        } else {
            body.push_str(&children);
        }

        let mut out = format!(
            "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" fill=\"none\" xmlns=\"http://www.w3.org/2000/svg\">",
            w = root.width,
            h = root.height
        );
        if !defs.is_empty() {
            let _ = write!(out, "<defs>{defs}</defs>");
        }
        out.push_str(&body);
        out.push_str("</svg>");
        Ok(out)
    }

    fn export_children(&self, parent: &SceneNode, origin: Affine) -> WorldviewResult<String> {
        let mut out = String::new();
        for child_id in &parent.children {
            let child = self.get(*child_id)?;
            if !child.visible {
                continue;
            }
            let placed = origin * node_transform(child);
            if child.kind == NativeKind::Text {
                tracing::warn!(node = %child.id, "text has no outline, leaving it out of the svg");
            }
            draw_paint(&mut out, child, local_shape(child, placed));
            // Group children share their parent's coordinate space.
            let inner = if child.kind == NativeKind::Group {
                origin
            } else {
                placed
            };
            out.push_str(&self.export_children(child, inner)?);
        }
        Ok(out)
    }

    /// Build a frame holding one vector child per path in `svg`.
    pub fn create_node_from_svg(&mut self, svg: &str) -> WorldviewResult<NodeId> {
        let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default())
            .map_err(|e| WorldviewError::asset(format!("parse svg: {e}")))?;

        let frame = self.create_frame();
        let size = tree.size();
        self.resize(frame, size.width() as f64, size.height() as f64)?;
        self.get_mut(frame)?.name = "Svg".to_string();

        let mut paths = Vec::new();
        collect_paths(tree.root(), &mut paths);
        for path in paths {
            let vector = self.create_vector();
            let node = self.get_mut(vector)?;
            node.x = path.bounds.x0;
            node.y = path.bounds.y0;
            node.width = path.bounds.width();
            node.height = path.bounds.height();
            node.fills = Mixed::Value(path.fill.into_iter().collect());
            node.strokes = path.stroke.iter().map(|(p, _)| p.clone()).collect();
            if let Some((_, weight)) = path.stroke {
                node.set_stroke_weight(weight);
            }
            node.vector = Some(VectorGeometry {
                vector_network: Default::default(),
                vector_paths: vec![VectorPath {
                    winding_rule: path.winding_rule,
                    data: path.data,
                }],
            });
            self.append_child(frame, vector)?;
        }
        Ok(frame)
    }
}

fn node_transform(node: &SceneNode) -> Affine {
    Affine::translate((node.x, node.y)) * Affine::rotate(-node.rotation.to_radians())
}

/// Geometry of `node` placed by `transform`, or `None` for kinds without their own outline.
fn local_shape(node: &SceneNode, transform: Affine) -> Option<BezPath> {
    let rect = Rect::new(0.0, 0.0, node.width, node.height);
    let path = match node.kind {
        NativeKind::Frame
        | NativeKind::Component
        | NativeKind::ComponentSet
        | NativeKind::Instance
        | NativeKind::Section
        | NativeKind::Rectangle => {
            let r = node.corner_radii;
            let radii =
                RoundedRectRadii::new(r.top_left, r.top_right, r.bottom_right, r.bottom_left);
            RoundedRect::from_rect(rect, radii).to_path(TOLERANCE)
        }
        NativeKind::Ellipse => Ellipse::from_rect(rect).to_path(TOLERANCE),
        NativeKind::Star => star_path(
            rect,
            node.shape.point_count.max(3),
            node.shape.inner_radius,
        ),
        NativeKind::Polygon => polygon_path(rect, node.shape.point_count.max(3)),
        NativeKind::Line => {
            let mut p = BezPath::new();
            p.move_to(Point::ZERO);
            p.line_to(Point::new(node.width, 0.0));
            p
        }
        NativeKind::Vector => {
            let mut p = BezPath::new();
            for vp in node.vector.iter().flat_map(|v| v.vector_paths.iter()) {
                match BezPath::from_svg(&vp.data) {
                    Ok(parsed) => p.extend(parsed.elements().iter().copied()),
                    Err(e) => tracing::debug!(node = %node.id, "skipping vector path: {e}"),
                }
            }
            p
        }
        NativeKind::Page
        | NativeKind::Group
        | NativeKind::Text
        | NativeKind::BooleanOperation
        | NativeKind::Slice => return None,
    };
    Some(transform * path)
}

fn star_path(rect: Rect, points: u32, ratio: f64) -> BezPath {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    let steps = points * 2;
    let mut path = BezPath::new();
    for i in 0..steps {
        let angle = -PI / 2.0 + PI * f64::from(i) / f64::from(points);
        let scale = if i % 2 == 0 { 1.0 } else { ratio };
        let p = Point::new(
            center.x + rx * scale * angle.cos(),
            center.y + ry * scale * angle.sin(),
        );
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn polygon_path(rect: Rect, sides: u32) -> BezPath {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    let mut path = BezPath::new();
    for i in 0..sides {
        let angle = -PI / 2.0 + 2.0 * PI * f64::from(i) / f64::from(sides);
        let p = Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn draw_paint(out: &mut String, node: &SceneNode, shape: Option<BezPath>) {
    let Some(shape) = shape else {
        return;
    };
    let fill = match &node.fills {
        Mixed::Value(stack) => first_solid(stack),
        Mixed::Mixed => None,
    };
    let stroke = first_solid(&node.strokes);
    if fill.is_none() && stroke.is_none() {
        return;
    }

    let _ = write!(out, "<path d=\"{}\"", shape.to_svg());
    match fill {
        Some((color, opacity)) => {
            let _ = write!(out, " fill=\"{}\"", hex(color));
            if opacity < 1.0 {
                let _ = write!(out, " fill-opacity=\"{opacity}\"");
            }
        }
        None => out.push_str(" fill=\"none\""),
    }
    if let Some((color, opacity)) = stroke {
        let weight = match node.stroke_weight() {
            Mixed::Value(w) => w,
            Mixed::Mixed => node.stroke_weights.top,
        };
        let _ = write!(
            out,
            " stroke=\"{}\" stroke-width=\"{weight}\"",
            hex(color)
        );
        if opacity < 1.0 {
            let _ = write!(out, " stroke-opacity=\"{opacity}\"");
        }
    }
    out.push_str("/>");
}

fn first_solid(stack: &[NativePaint]) -> Option<(Rgb, f64)> {
    stack
        .iter()
        .filter(|p| p.visible)
        .find_map(|p| p.solid_rgba().map(|c| (c.rgb(), p.opacity)))
}

fn hex(color: Rgb) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        channel_byte(color.r),
        channel_byte(color.g),
        channel_byte(color.b)
    )
}

struct ImportedPath {
    bounds: Rect,
    data: String,
    winding_rule: WindingRule,
    fill: Option<NativePaint>,
    stroke: Option<(NativePaint, f64)>,
}

fn collect_paths(group: &usvg::Group, out: &mut Vec<ImportedPath>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => collect_paths(g.as_ref(), out),
            usvg::Node::Text(t) => collect_paths(t.flattened(), out),
            usvg::Node::Path(p) => {
                if p.is_visible() {
                    out.push(import_path(p));
                }
            }
            usvg::Node::Image(_) => {}
        }
    }
}

fn import_path(path: &usvg::Path) -> ImportedPath {
    use usvg::tiny_skia_path::PathSegment;

    let t = path.abs_transform();
    let affine = Affine::new([
        f64::from(t.sx),
        f64::from(t.ky),
        f64::from(t.kx),
        f64::from(t.sy),
        f64::from(t.tx),
        f64::from(t.ty),
    ]);
    let pt = |p: usvg::tiny_skia_path::Point| affine * Point::new(f64::from(p.x), f64::from(p.y));

    let mut bez = BezPath::new();
    for seg in path.data().segments() {
        match seg {
            PathSegment::MoveTo(p) => bez.move_to(pt(p)),
            PathSegment::LineTo(p) => bez.line_to(pt(p)),
            PathSegment::QuadTo(p1, p2) => bez.quad_to(pt(p1), pt(p2)),
            PathSegment::CubicTo(p1, p2, p3) => bez.curve_to(pt(p1), pt(p2), pt(p3)),
            PathSegment::Close => bez.close_path(),
        }
    }
    let bounds = bez.bounding_box();
    let local = Affine::translate((-bounds.x0, -bounds.y0)) * bez;

    let winding_rule = match path.fill().map(|f| f.rule()) {
        Some(usvg::FillRule::EvenOdd) => WindingRule::Evenodd,
        _ => WindingRule::Nonzero,
    };
    let fill = path.fill().and_then(|f| match f.paint() {
        usvg::Paint::Color(c) => Some(NativePaint::solid(
            color_of(*c),
            f64::from(f.opacity().get()),
        )),
        _ => None,
    });
    let stroke = path.stroke().and_then(|s| match s.paint() {
        usvg::Paint::Color(c) => Some((
            NativePaint::solid(color_of(*c), f64::from(s.opacity().get())),
            f64::from(s.width().get()),
        )),
        _ => None,
    });

    ImportedPath {
        bounds,
        data: local.to_svg(),
        winding_rule,
        fill,
        stroke,
    }
}

fn color_of(c: usvg::Color) -> Rgb {
    Rgb {
        r: f64::from(c.red) / 255.0,
        g: f64::from(c.green) / 255.0,
        b: f64::from(c.blue) / 255.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/svg.rs"]
mod tests;
