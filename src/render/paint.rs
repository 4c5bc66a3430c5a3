use crate::canvas::{Canvas, NativePaint, NativePaintKind};
use crate::model::document::{AssetPayload, Assets};
use crate::model::paint::Paint;
use crate::model::value::Indirect;

/// Native paint stack for a themeable paint field.
///
/// The stack is always built from the literal first. A `Variable` whose id is bound in `assets`
/// to a live color variable is then upgraded to reference it; anything else keeps the fallback.
pub(crate) fn resolve_paint(
    canvas: &mut Canvas,
    field: &Indirect<Paint>,
    assets: Option<&Assets>,
) -> Vec<NativePaint> {
    let mut stack = native_paints(canvas, field.literal(), assets);
    if let Some(id) = field.variable_id() {
        bind_variable(canvas, &mut stack, id, assets);
    }
    stack
}

fn native_paints(canvas: &mut Canvas, paint: &Paint, assets: Option<&Assets>) -> Vec<NativePaint> {
    match paint {
        Paint::Solid(s) => vec![NativePaint::solid(s.color.rgb(), s.color.a)],
        Paint::Image(img) => {
            let hash = image_hash(canvas, &img.image_hash, assets);
            vec![NativePaint::image(Some(hash), img.scale_mode)]
        }
        Paint::MixedPaint { values } => values
            .iter()
            .flat_map(|value| resolve_paint(canvas, value, assets))
            .collect(),
        gradient => match gradient.as_gradient() {
            Some((kind, g)) => vec![NativePaint::gradient(kind, g.clone())],
            None => Vec::new(),
        },
    }
}

/// Canvas hash for an image key: bound handles win, bound bytes are stored, else the key itself.
fn image_hash(canvas: &mut Canvas, key: &str, assets: Option<&Assets>) -> String {
    match assets.and_then(|a| a.get(key)) {
        Some(AssetPayload::Handle(hash)) => hash.clone(),
        Some(AssetPayload::Bytes(bytes)) => match canvas.create_image(bytes) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(key, "bound image bytes rejected: {e}");
                key.to_string()
            }
        },
        None => key.to_string(),
    }
}

fn bind_variable(
    canvas: &Canvas,
    stack: &mut [NativePaint],
    id: &str,
    assets: Option<&Assets>,
) {
    let Some(handle) = assets.and_then(|a| a.get(id)).and_then(AssetPayload::as_handle) else {
        return;
    };
    let Some(variable) = canvas.variable(handle) else {
        tracing::warn!(id, handle, "bound variable does not exist, keeping fallback");
        return;
    };
    match stack {
        [paint] => match &mut paint.kind {
            NativePaintKind::Solid(solid) => {
                solid.color = variable.value.rgb();
                solid.bound_variable = Some(variable.id.clone());
                paint.opacity = variable.value.a;
            }
            _ => tracing::warn!(id, "only solid paints bind to color variables"),
        },
        _ => tracing::warn!(id, "only single paints bind to color variables"),
    }
}

/// Text content of a themeable string field. Variables render their fallback.
pub(crate) fn resolve_text(field: &Indirect<String>) -> &str {
    field.literal()
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
