use crate::assets::cache::{ImageCache, ImageFetcher};
use crate::canvas::Canvas;
use crate::foundation::core::Rgba;
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::document::{AssetPayload, Assets, ImageAsset, Screen};
use crate::model::paint::Paint;

/// Collection that theme colors are bound into.
pub const COLOR_COLLECTION: &str = "Colors";

/// Name of the color variable created for a theme color key.
pub fn color_variable_name(key: &str) -> String {
    format!("Color-{key}")
}

/// Raw bytes for every image in the screens' themes, ready to submit for upload.
///
/// Preprocessed entries read the canvas image store; a missing image is an error. Postprocessed
/// entries are fetched through the cache. The first screen naming a key wins.
#[tracing::instrument(skip_all)]
pub async fn collect_upload_assets<'a>(
    canvas: &Canvas,
    screens: impl IntoIterator<Item = &'a Screen>,
    cache: &ImageCache,
    fetcher: &dyn ImageFetcher,
) -> WorldviewResult<Assets> {
    let mut assets = Assets::new();
    for screen in screens {
        for (key, image) in &screen.meta.theme.images {
            if assets.contains_key(key) {
                continue;
            }
            let bytes = match image {
                ImageAsset::Preprocessed(paint) => canvas
                    .image_bytes(&paint.image_hash)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| {
                        WorldviewError::asset(format!(
                            "image {} is not on the canvas",
                            paint.image_hash
                        ))
                    })?,
                ImageAsset::Postprocessed(remote) => {
                    cache.get_or_fetch(key, &remote.url, fetcher).await?.to_vec()
                }
            };
            assets.insert(key.clone(), AssetPayload::Bytes(bytes));
        }
    }
    tracing::debug!(count = assets.len(), "collected upload assets");
    Ok(assets)
}

/// Binding table for drawing downloaded screens.
///
/// Images become canvas image hashes keyed by their theme key; theme colors become color
/// variables in the [`COLOR_COLLECTION`] collection, reused by name when they already exist.
/// A failed image or variable is logged and left unbound, so the renderer uses the fallback.
#[tracing::instrument(skip_all)]
pub async fn resolve_download_assets(
    canvas: &mut Canvas,
    screens: &[Screen],
    cache: &ImageCache,
    fetcher: &dyn ImageFetcher,
) -> Assets {
    let mut assets = Assets::new();
    let collection = match canvas.collection_by_name(COLOR_COLLECTION) {
        Some(c) => c.id.clone(),
        None => canvas.create_collection(COLOR_COLLECTION),
    };

    for screen in screens {
        for (key, image) in &screen.meta.theme.images {
            if assets.contains_key(key) {
                continue;
            }
            let bound = match image {
                ImageAsset::Preprocessed(paint) => {
                    match canvas.image_bytes(&paint.image_hash) {
                        Some(_) => Ok(paint.image_hash.clone()),
                        None => Err(WorldviewError::asset(format!(
                            "image {} is not on the canvas",
                            paint.image_hash
                        ))),
                    }
                }
                ImageAsset::Postprocessed(remote) => {
                    match cache.get_or_fetch(key, &remote.url, fetcher).await {
                        Ok(bytes) => canvas.create_image(&bytes),
                        Err(e) => Err(e),
                    }
                }
            };
            match bound {
                Ok(hash) => {
                    assets.insert(key.clone(), AssetPayload::Handle(hash));
                }
                Err(e) => tracing::warn!(key = %key, "image left unbound: {e}"),
            }
        }

        for (key, paint) in &screen.meta.theme.colors {
            if assets.contains_key(key) {
                continue;
            }
            match bind_color(canvas, &collection, key, paint) {
                Ok(id) => {
                    assets.insert(key.clone(), AssetPayload::Handle(id));
                }
                Err(e) => tracing::warn!(key = %key, "color variable not created: {e}"),
            }
        }
    }
    assets
}

fn bind_color(
    canvas: &mut Canvas,
    collection: &str,
    key: &str,
    paint: &Paint,
) -> WorldviewResult<String> {
    let name = color_variable_name(key);
    if let Some(existing) = canvas.color_variable_by_name(&name) {
        return Ok(existing.id.clone());
    }
    let color = paint
        .as_solid()
        .map(|s| s.color)
        .ok_or_else(|| WorldviewError::asset(format!("theme color {key} is not a solid paint")))?;
    // A zero alpha is stored as opaque.
    let value = if color.a == 0.0 {
        Rgba { a: 1.0, ..color }
    } else {
        color
    };
    canvas.create_color_variable(&name, collection, value)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
