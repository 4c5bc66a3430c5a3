use serde::{Deserialize, Serialize};

use crate::foundation::core::{Rgba, Transform2x3};
use crate::model::value::Indirect;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid(SolidPaint),
    Image(ImagePaint),
    GradientLinear(GradientPaint),
    GradientRadial(GradientPaint),
    GradientDiamond(GradientPaint),
    GradientAngular(GradientPaint),
    /// Several paints applied to one field; each entry becomes one layer of the native stack.
    MixedPaint { values: Vec<Indirect<Paint>> },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidPaint {
    pub color: Rgba,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaint {
    pub scale_mode: ScaleMode,
    pub image_hash: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleMode {
    #[default]
    Fill,
    Fit,
    Crop,
    Tile,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientPaint {
    pub gradient_stops: Vec<ColorStop>,
    pub gradient_transform: Transform2x3,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient axis, in `[0, 1]`.
    pub position: f64,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradientKind {
    GradientLinear,
    GradientRadial,
    GradientDiamond,
    GradientAngular,
}

impl Paint {
    pub fn solid(color: Rgba) -> Self {
        Self::Solid(SolidPaint { color })
    }

    pub fn image(image_hash: impl Into<String>, scale_mode: ScaleMode) -> Self {
        Self::Image(ImagePaint {
            scale_mode,
            image_hash: image_hash.into(),
        })
    }

    pub fn gradient(kind: GradientKind, gradient: GradientPaint) -> Self {
        match kind {
            GradientKind::GradientLinear => Self::GradientLinear(gradient),
            GradientKind::GradientRadial => Self::GradientRadial(gradient),
            GradientKind::GradientDiamond => Self::GradientDiamond(gradient),
            GradientKind::GradientAngular => Self::GradientAngular(gradient),
        }
    }

    pub fn as_gradient(&self) -> Option<(GradientKind, &GradientPaint)> {
        match self {
            Self::GradientLinear(g) => Some((GradientKind::GradientLinear, g)),
            Self::GradientRadial(g) => Some((GradientKind::GradientRadial, g)),
            Self::GradientDiamond(g) => Some((GradientKind::GradientDiamond, g)),
            Self::GradientAngular(g) => Some((GradientKind::GradientAngular, g)),
            Self::Solid(_) | Self::Image(_) | Self::MixedPaint { .. } => None,
        }
    }

    pub fn as_solid(&self) -> Option<&SolidPaint> {
        match self {
            Self::Solid(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/paint.rs"]
mod tests;
