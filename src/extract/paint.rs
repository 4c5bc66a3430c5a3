use crate::canvas::{Canvas, Mixed, NativeEffect, NativePaint, NativePaintKind, NodeId, SceneNode};
use crate::foundation::core::Rgba;
use crate::foundation::error::{ExtractError, ExtractErrorKind, WorldviewResult};
use crate::model::effect::{Effect, Shadow};
use crate::model::paint::{GradientKind, Paint};
use crate::model::reaction::Reaction;

fn qualifies(paint: &NativePaint) -> bool {
    paint.visible && paint.opacity > 0.0
}

/// First visible paint of the fill stack, images ahead of solids.
///
/// A `MIXED` stack or an image paint without a hash is an error. `Ok(None)` means the node
/// has no qualifying paint.
pub(crate) fn paint_from_fills(node: &SceneNode) -> Result<Option<Paint>, ExtractError> {
    let stack = match &node.fills {
        Mixed::Value(stack) => stack,
        Mixed::Mixed => return Err(ExtractError::new(node.id, ExtractErrorKind::MixedFills)),
    };
    for paint in images_before_solids(stack) {
        let converted = match &paint.kind {
            NativePaintKind::Image(img) => {
                let Some(hash) = &img.image_hash else {
                    return Err(ExtractError::new(
                        node.id,
                        ExtractErrorKind::MissingImageHash,
                    ));
                };
                Paint::image(hash.clone(), img.scale_mode)
            }
            NativePaintKind::Solid(s) => Paint::solid(s.color.with_alpha(paint.opacity)),
            NativePaintKind::GradientLinear(g) => {
                Paint::gradient(GradientKind::GradientLinear, g.clone())
            }
            NativePaintKind::GradientRadial(g) => {
                Paint::gradient(GradientKind::GradientRadial, g.clone())
            }
            NativePaintKind::GradientDiamond(g) => {
                Paint::gradient(GradientKind::GradientDiamond, g.clone())
            }
            NativePaintKind::GradientAngular(g) => {
                Paint::gradient(GradientKind::GradientAngular, g.clone())
            }
        };
        if qualifies(paint) {
            return Ok(Some(converted));
        }
    }
    Ok(None)
}

/// Images move ahead of the solids before them. Every other pair keeps its order, so a
/// gradient still shields a solid from a later image.
fn images_before_solids(stack: &[NativePaint]) -> Vec<&NativePaint> {
    let mut sorted: Vec<&NativePaint> = stack.iter().collect();
    let mut swapped = true;
    while swapped {
        swapped = false;
        for i in 1..sorted.len() {
            if matches!(sorted[i - 1].kind, NativePaintKind::Solid(_))
                && matches!(sorted[i].kind, NativePaintKind::Image(_))
            {
                sorted.swap(i - 1, i);
                swapped = true;
            }
        }
    }
    sorted
}

fn first_solid(stack: &[NativePaint]) -> Option<Paint> {
    stack
        .iter()
        .filter(|p| qualifies(p))
        .find_map(|p| p.solid_rgba().map(Paint::solid))
}

/// First visible solid fill; a `MIXED` stack reads as opaque black.
pub(crate) fn solid_from_fills(node: &SceneNode) -> Option<Paint> {
    match &node.fills {
        Mixed::Value(stack) => first_solid(stack),
        Mixed::Mixed => Some(Paint::solid(Rgba::BLACK)),
    }
}

pub(crate) fn solid_from_strokes(node: &SceneNode) -> Option<Paint> {
    first_solid(&node.strokes)
}

/// Depth-first search for the first visible solid fill in the subtree of `id`.
///
/// Stops at the first match. A `MIXED` stack anywhere on the way fails the search.
pub(crate) fn find_solid_fill(canvas: &Canvas, id: NodeId) -> WorldviewResult<Option<Paint>> {
    let node = canvas.get(id)?;
    match &node.fills {
        Mixed::Mixed => {
            return Err(ExtractError::new(id, ExtractErrorKind::MixedFills).into());
        }
        Mixed::Value(stack) => {
            if let Some(found) = first_solid(stack) {
                return Ok(Some(found));
            }
        }
    }
    for child in &node.children {
        if let Some(found) = find_solid_fill(canvas, *child)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Depth-first search for the first visible solid stroke in the subtree of `id`.
pub(crate) fn find_solid_stroke(canvas: &Canvas, id: NodeId) -> WorldviewResult<Option<Paint>> {
    let node = canvas.get(id)?;
    if let Some(found) = solid_from_strokes(node) {
        return Ok(Some(found));
    }
    for child in &node.children {
        if let Some(found) = find_solid_stroke(canvas, *child)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Visible, non-transparent shadows. Blurs are dropped.
pub(crate) fn effects_of(node: &SceneNode) -> Option<Vec<Effect>> {
    let effects: Vec<Effect> = node
        .effects
        .iter()
        .filter_map(|effect| {
            let (shadow, inner) = match effect {
                NativeEffect::DropShadow(s) => (s, false),
                NativeEffect::InnerShadow(s) => (s, true),
                NativeEffect::LayerBlur(_) | NativeEffect::BackgroundBlur(_) => return None,
            };
            if !shadow.visible || shadow.color.a <= 0.0 {
                return None;
            }
            let copy = Shadow {
                color: shadow.color,
                offset: shadow.offset,
                radius: shadow.radius,
                spread: shadow.spread,
            };
            Some(if inner {
                Effect::InnerShadow(copy)
            } else {
                Effect::DropShadow(copy)
            })
        })
        .collect();
    (!effects.is_empty()).then_some(effects)
}

pub(crate) fn reactions_of(node: &SceneNode) -> Option<Vec<Reaction>> {
    (!node.reactions.is_empty()).then(|| node.reactions.clone())
}

/// Scalar stroke weight if positive; `MIXED` is an error.
pub(crate) fn stroke_weight_of(node: &SceneNode) -> Result<Option<f64>, ExtractError> {
    match node.stroke_weight() {
        Mixed::Value(w) => Ok((w > 0.0).then_some(w)),
        Mixed::Mixed => Err(ExtractError::new(
            node.id,
            ExtractErrorKind::MixedStrokeWeight,
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/extract/paint.rs"]
mod tests;
