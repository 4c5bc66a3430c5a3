use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::node::WorldviewNode;
use crate::model::paint::{ImagePaint, Paint};

/// Deduplicated paint/text values keyed by the ids that `Variable` references carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub colors: BTreeMap<String, Paint>,
    #[serde(default)]
    pub images: BTreeMap<String, ImageAsset>,
    /// Reserved; nothing populates it yet.
    #[serde(default)]
    pub icons: BTreeMap<String, String>,
    #[serde(default)]
    pub characters: BTreeMap<String, String>,
    #[serde(default)]
    pub gradients: BTreeMap<String, Paint>,
}

impl Theme {
    /// Number of dictionaries holding `key`.
    pub fn entries_for(&self, key: &str) -> usize {
        [
            self.colors.contains_key(key),
            self.images.contains_key(key),
            self.icons.contains_key(key),
            self.characters.contains_key(key),
            self.gradients.contains_key(key),
        ]
        .into_iter()
        .filter(|hit| *hit)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.images.is_empty()
            && self.icons.is_empty()
            && self.characters.is_empty()
            && self.gradients.is_empty()
    }
}

/// Image theme entry. Moves one way, from `Preprocessed` to `Postprocessed`, once uploaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageAsset {
    Preprocessed(ImagePaint),
    Postprocessed(RemoteImage),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenMeta {
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(default)]
    pub meta: ScreenMeta,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub root: WorldviewNode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub screens: Vec<Screen>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub name: String,
    pub apps: Vec<App>,
}

impl Epoch {
    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.apps.iter().flat_map(|app| app.screens.iter())
    }

    pub fn screens_mut(&mut self) -> impl Iterator<Item = &mut Screen> {
        self.apps.iter_mut().flat_map(|app| app.screens.iter_mut())
    }
}

/// Binding table from asset key to payload.
pub type Assets = BTreeMap<String, AssetPayload>;

/// `number[]` before upload, a string handle (remote id, URL, image hash or variable id) after.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetPayload {
    Bytes(Vec<u8>),
    Handle(String),
}

impl AssetPayload {
    pub fn as_handle(&self) -> Option<&str> {
        match self {
            Self::Handle(h) => Some(h),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Handle(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
