//! Extract, redraw and re-extract a subtree, then compare the two trees.
//!
//! Equality is checked after these normalizations, which are accepted non-identity points:
//! - redrawn nodes get fresh native ids, mapped back through the render pass's [`IdMapping`];
//!   reaction destinations are mapped the same way
//! - the redrawn root sits wherever it was placed, so both roots are moved to `(0, 0)`
//! - icon markup is regenerated from the redrawn vectors, so icon `data` is blanked on both sides
//!
//! Container resize-to-fit, effect filtering and icon flattening already happen during the first
//! extraction and need no further treatment.
//!
//! [`IdMapping`]: crate::IdMapping

use std::collections::BTreeMap;

use serde_json::Value;

use crate::canvas::{Canvas, NodeId};
use crate::extract::extract_node;
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::node::WorldviewNode;
use crate::model::value::Indirect;
use crate::render::{NoPacing, RenderOutcome, RenderSettings, draw_node};

/// Both sides of a round trip, already normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundTrip {
    pub original: WorldviewNode,
    pub redrawn: WorldviewNode,
    pub outcome: RenderOutcome,
}

impl RoundTrip {
    pub fn matches(&self) -> bool {
        self.original == self.redrawn
    }

    /// JSON pointer of the first place the two trees disagree.
    pub fn first_difference(&self) -> Option<String> {
        let a = serde_json::to_value(&self.original).ok()?;
        let b = serde_json::to_value(&self.redrawn).ok()?;
        diff_path(&a, &b, String::new())
    }
}

/// Round-trip `root` through the same canvas, drawing the copy on the page without pacing.
#[tracing::instrument(skip(canvas))]
pub async fn roundtrip(canvas: &mut Canvas, root: NodeId) -> WorldviewResult<RoundTrip> {
    let mut original = extract_node(canvas, root)?;
    let page = canvas.page();
    let outcome = draw_node(
        canvas,
        &original,
        page,
        &RenderSettings::default(),
        &NoPacing,
    )
    .await?;
    let drawn = outcome
        .roots
        .first()
        .copied()
        .ok_or_else(|| WorldviewError::render("round trip drew nothing"))?;
    let mut redrawn = extract_node(canvas, drawn)?;

    restore_ids(&mut redrawn, &outcome.ids.inverse());
    normalize(&mut original);
    normalize(&mut redrawn);
    let trip = RoundTrip {
        original,
        redrawn,
        outcome,
    };
    if let Some(path) = trip.first_difference() {
        tracing::info!(path, "round trip differs");
    }
    Ok(trip)
}

/// Rewrite native ids, and reaction destinations, back to the ids they were drawn from.
pub fn restore_ids(node: &mut WorldviewNode, native_to_extracted: &BTreeMap<String, String>) {
    node.walk_mut(&mut |n| {
        let base = n.base_mut();
        if let Some(id) = native_to_extracted.get(&base.id) {
            base.id = id.clone();
        }
        for reaction in base.reaction.iter_mut().flatten() {
            let actions = reaction.action.iter_mut().chain(reaction.actions.iter_mut());
            for action in actions {
                if let Some(dest) = action.destination_id.as_mut()
                    && let Some(id) = native_to_extracted.get(dest.as_str())
                {
                    *dest = id.clone();
                }
            }
        }
    });
}

fn normalize(root: &mut WorldviewNode) {
    let base = root.base_mut();
    base.x = 0.0;
    base.y = 0.0;
    root.walk_mut(&mut |n| {
        if let WorldviewNode::IconContainer(icon) = n {
            icon.data = Indirect::Value(String::new());
        }
    });
}

fn diff_path(a: &Value, b: &Value, path: String) -> Option<String> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            let keys = x.keys().chain(y.keys().filter(|k| !x.contains_key(*k)));
            for key in keys {
                let child = format!("{path}/{key}");
                match (x.get(key), y.get(key)) {
                    (Some(l), Some(r)) => {
                        if let Some(found) = diff_path(l, r, child) {
                            return Some(found);
                        }
                    }
                    _ => return Some(child),
                }
            }
            None
        }
        (Value::Array(x), Value::Array(y)) => {
            for (i, (l, r)) in x.iter().zip(y).enumerate() {
                if let Some(found) = diff_path(l, r, format!("{path}/{i}")) {
                    return Some(found);
                }
            }
            (x.len() != y.len()).then(|| format!("{path}/{}", x.len().min(y.len())))
        }
        _ => (a != b).then_some(path),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/roundtrip/mod.rs"]
mod tests;
