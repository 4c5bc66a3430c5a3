use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::canvas::node::{Mixed, NativeKind, NativePaintKind, NodeId, SceneNode};
use crate::canvas::{Canvas, Viewport};
use crate::foundation::core::Vector;
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::text::FontName;

/// Nested, portable form of a canvas page.
///
/// Node `id`s are free-form labels. Loading assigns fresh native ids and rewrites reaction
/// destinations and image references that name a label.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
    /// Faces to install on top of the default font book.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontName>,
    /// Image label or hash to base64 bytes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub center: Vector,
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub node: SceneNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl CanvasSnapshot {
    pub fn from_json(json: &str) -> WorldviewResult<Self> {
        serde_json::from_str(json).map_err(|e| WorldviewError::serde(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> WorldviewResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WorldviewError::serde(e.to_string()))
    }
}

/// Result of loading a snapshot: the canvas plus the label each node was created from.
#[derive(Debug)]
pub struct LoadedCanvas {
    pub canvas: Canvas,
    pub labels: BTreeMap<String, NodeId>,
}

impl LoadedCanvas {
    pub fn id(&self, label: &str) -> WorldviewResult<NodeId> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| WorldviewError::validation(format!("no node labelled \"{label}\"")))
    }
}

impl Canvas {
    pub fn from_snapshot(snapshot: &CanvasSnapshot) -> WorldviewResult<LoadedCanvas> {
        let mut canvas = Canvas::new();
        for font in &snapshot.fonts {
            canvas.fonts.install(font.clone());
        }

        let mut image_keys = BTreeMap::new();
        for (key, encoded) in &snapshot.images {
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|e| WorldviewError::serde(format!("image \"{key}\": {e}")))?;
            let hash = canvas.create_image(&bytes)?;
            image_keys.insert(key.clone(), hash);
        }

        let mut labels = BTreeMap::new();
        let page = canvas.page;
        for node in &snapshot.nodes {
            canvas.load_node(node, page, &mut labels)?;
        }

        for id in canvas.subtree(page) {
            let Some(node) = canvas.nodes.get_mut(&id) else {
                continue;
            };
            for reaction in &mut node.reactions {
                let actions = reaction.action.iter_mut().chain(reaction.actions.iter_mut());
                for action in actions {
                    if let Some(dest) = action.destination_id.as_mut()
                        && let Some(mapped) = labels.get(dest.as_str())
                    {
                        *dest = mapped.to_string();
                    }
                }
            }
            if let Mixed::Value(fills) = &mut node.fills {
                for paint in fills {
                    if let NativePaintKind::Image(img) = &mut paint.kind
                        && let Some(hash) = img.image_hash.as_mut()
                        && let Some(mapped) = image_keys.get(hash.as_str())
                    {
                        *hash = mapped.clone();
                    }
                }
            }
        }

        if let Some(v) = snapshot.viewport {
            canvas.viewport = Viewport {
                center: v.center,
                zoom: v.zoom,
            };
        }
        canvas.selection = snapshot
            .selection
            .iter()
            .filter_map(|label| labels.get(label).copied())
            .collect();

        Ok(LoadedCanvas { canvas, labels })
    }

    fn load_node(
        &mut self,
        snap: &SnapshotNode,
        parent: NodeId,
        labels: &mut BTreeMap<String, NodeId>,
    ) -> WorldviewResult<NodeId> {
        if snap.node.kind == NativeKind::Page {
            return Err(WorldviewError::validation("pages cannot be nested"));
        }
        let id = self.create(snap.node.kind);
        let node = self.get_mut(id)?;
        *node = SceneNode {
            id,
            parent: None,
            children: Vec::new(),
            ..snap.node.clone()
        };
        if node.kind == NativeKind::Text && node.text.is_none() {
            node.text = Some(Default::default());
        }
        self.append_child(parent, id)?;
        if let Some(label) = &snap.id {
            labels.insert(label.clone(), id);
        }
        for child in &snap.children {
            self.load_node(child, id, labels)?;
        }
        Ok(id)
    }

    /// Snapshot the page, labelling every node with its current id.
    pub fn snapshot(&self) -> CanvasSnapshot {
        let nodes = self
            .children(self.page)
            .iter()
            .filter_map(|id| self.snapshot_node(*id))
            .collect();
        let images = self
            .images
            .iter()
            .map(|(hash, bytes)| (hash.clone(), STANDARD.encode(bytes)))
            .collect();
        let fonts = self.fonts.available.iter().cloned().collect();
        CanvasSnapshot {
            viewport: Some(ViewportSnapshot {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            }),
            selection: self.selection.iter().map(NodeId::to_string).collect(),
            fonts,
            images,
            nodes,
        }
    }

    fn snapshot_node(&self, id: NodeId) -> Option<SnapshotNode> {
        let node = self.nodes.get(&id)?;
        Some(SnapshotNode {
            id: Some(id.to_string()),
            node: node.clone(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.snapshot_node(*c))
                .collect(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/snapshot.rs"]
mod tests;
