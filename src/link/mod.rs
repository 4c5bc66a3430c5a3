//! Second pass of a render: point interactive links at the nodes that were just drawn.
//!
//! Destinations are extraction ids. They can only be resolved once every node of the batch
//! exists, because links usually point forward to siblings drawn later.

use crate::canvas::Canvas;
use crate::model::node::WorldviewNode;
use crate::model::reaction::Reaction;
use crate::render::IdMapping;

/// Reaction counts from one link pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Reactions written onto native nodes.
    pub resolved: usize,
    /// Reactions dropped because a destination was not drawn onto the page in this batch.
    pub dropped: usize,
}

/// Rewrite the reactions of every node under `roots` to native ids and set them on the
/// native nodes recorded in `ids`.
///
/// A reaction survives only if every destination it names is in `ids` and still attached to the
/// page. Nodes that are not on the page themselves get no links.
#[tracing::instrument(skip_all)]
pub fn link_reactions(
    canvas: &mut Canvas,
    roots: &[WorldviewNode],
    ids: &IdMapping,
) -> LinkReport {
    let mut report = LinkReport::default();
    for root in roots {
        root.walk(&mut |node| {
            if node.reactions().is_empty() {
                return;
            }
            let Some(native) = ids.get(node.id()).filter(|id| canvas.is_attached(*id)) else {
                tracing::debug!(node = node.id(), "node was not drawn, skipping its links");
                return;
            };
            let mut kept = Vec::with_capacity(node.reactions().len());
            for reaction in node.reactions() {
                match resolve(canvas, reaction, ids) {
                    Some(resolved) => kept.push(resolved),
                    None => {
                        report.dropped += 1;
                        tracing::warn!(
                            node = node.id(),
                            "dropping link to a node outside this batch"
                        );
                    }
                }
            }
            match canvas.get_mut(native) {
                Ok(target) => {
                    report.resolved += kept.len();
                    target.reactions = kept;
                }
                Err(e) => tracing::warn!(node = node.id(), "cannot set links: {e}"),
            }
        });
    }
    report
}

fn resolve(canvas: &Canvas, reaction: &Reaction, ids: &IdMapping) -> Option<Reaction> {
    let mut out = reaction.clone();
    let actions = out.action.iter_mut().chain(out.actions.iter_mut());
    for action in actions {
        if let Some(dest) = action.destination_id.as_mut() {
            let native = ids.get(dest).filter(|id| canvas.is_attached(*id))?;
            *dest = native.to_string();
        }
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/link/mod.rs"]
mod tests;
