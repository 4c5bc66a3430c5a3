use serde::{Deserialize, Serialize};

/// Interactive transition copied from the host as-is; only `destinationId` is interpreted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub trigger: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn navigate(destination: impl Into<String>) -> Self {
        Self {
            kind: "NODE".to_string(),
            destination_id: Some(destination.into()),
            extra: serde_json::Map::new(),
        }
    }
}

impl Reaction {
    pub fn on_click(action: Action) -> Self {
        Self {
            action: Some(action.clone()),
            actions: vec![action],
            trigger: Some(serde_json::json!({ "type": "ON_CLICK" })),
        }
    }

    /// Every action of this reaction, the legacy single slot first.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.action.iter().chain(self.actions.iter())
    }
}
