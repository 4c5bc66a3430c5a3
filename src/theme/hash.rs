use crate::foundation::core::Rgba;
use crate::model::paint::Paint;

/// `#RRGGBB`, or `#RRGGBBAA` when the color is translucent. Uppercase.
pub fn color_hex(color: Rgba) -> String {
    let [r, g, b, a] = color.to_bytes();
    if color.a < 1.0 {
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    } else {
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

/// Theme key for a paint.
///
/// Solids hash to their hex color and images to their content hash. Gradients get a fresh
/// random token on every call, so equal gradients are never merged into one theme entry.
pub fn paint_key(paint: &Paint) -> String {
    match paint {
        Paint::Solid(s) => color_hex(s.color),
        Paint::Image(img) => img.image_hash.clone(),
        Paint::GradientLinear(_)
        | Paint::GradientRadial(_)
        | Paint::GradientDiamond(_)
        | Paint::GradientAngular(_)
        | Paint::MixedPaint { .. } => gradient_token(),
    }
}

/// Theme key for a text literal. The prefix keeps text such as `#FFFFFF` apart from color keys.
pub fn characters_key(text: &str) -> String {
    format!("{CHARACTERS_KEY_PREFIX}{text}")
}

const CHARACTERS_KEY_PREFIX: &str = "text:";

fn gradient_token() -> String {
    format!("gradient-{:016x}", rand::random::<u64>())
}

#[cfg(test)]
#[path = "../../tests/unit/theme/hash.rs"]
mod tests;
