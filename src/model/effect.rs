use serde::{Deserialize, Serialize};

use crate::foundation::core::{Rgba, Vector};

/// The only effect kinds that survive extraction. Blurs are dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    DropShadow(Shadow),
    InnerShadow(Shadow),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgba,
    pub offset: Vector,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

impl Effect {
    pub fn shadow(&self) -> &Shadow {
        match self {
            Self::DropShadow(s) | Self::InnerShadow(s) => s,
        }
    }
}
