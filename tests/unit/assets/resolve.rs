use std::collections::HashMap;

use async_trait::async_trait;

use super::*;
use crate::model::document::{RemoteImage, ScreenMeta, Theme};
use crate::model::node::{GroupNode, NodeBase, WorldviewNode};
use crate::model::paint::ScaleMode;

struct MapFetcher(HashMap<String, Vec<u8>>);

#[async_trait]
impl ImageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> WorldviewResult<Vec<u8>> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| WorldviewError::asset(format!("404 {url}")))
    }
}

fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn screen(theme: Theme) -> Screen {
    Screen {
        meta: ScreenMeta { theme },
        name: "Home".into(),
        description: String::new(),
        root: WorldviewNode::Group(GroupNode {
            base: NodeBase::new("1:1", "root"),
            children: None,
        }),
    }
}

#[tokio::test]
async fn upload_reads_canvas_images_and_fetches_remote_ones() {
    let mut canvas = Canvas::new();
    let local = png_bytes([1, 2, 3, 255]);
    let hash = canvas.create_image(&local).unwrap();

    let mut theme = Theme::default();
    theme.images.insert(
        hash.clone(),
        ImageAsset::Preprocessed(crate::model::paint::ImagePaint {
            scale_mode: ScaleMode::Fill,
            image_hash: hash.clone(),
        }),
    );
    theme.images.insert(
        "remote".into(),
        ImageAsset::Postprocessed(RemoteImage {
            url: "r.png".into(),
            description: "hero".into(),
        }),
    );
    let fetcher = MapFetcher(HashMap::from([("r.png".to_string(), vec![4, 5])]));

    let screens = [screen(theme)];
    let assets = collect_upload_assets(&canvas, &screens, &ImageCache::default(), &fetcher)
        .await
        .unwrap();
    assert_eq!(assets[&hash].as_bytes(), Some(local.as_slice()));
    assert_eq!(assets["remote"].as_bytes(), Some(&[4u8, 5][..]));
}

#[tokio::test]
async fn upload_fails_when_a_local_image_is_gone() {
    let canvas = Canvas::new();
    let mut theme = Theme::default();
    theme.images.insert(
        "gone".into(),
        ImageAsset::Preprocessed(crate::model::paint::ImagePaint {
            scale_mode: ScaleMode::Fill,
            image_hash: "gone".into(),
        }),
    );
    let fetcher = MapFetcher(HashMap::new());
    let screens = [screen(theme)];
    let result =
        collect_upload_assets(&canvas, &screens, &ImageCache::default(), &fetcher).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn download_binds_images_and_colors() {
    let mut canvas = Canvas::new();
    let bytes = png_bytes([200, 0, 0, 255]);
    let mut theme = Theme::default();
    theme.images.insert(
        "hero".into(),
        ImageAsset::Postprocessed(RemoteImage {
            url: "hero.png".into(),
            description: String::new(),
        }),
    );
    theme.images.insert(
        "broken".into(),
        ImageAsset::Postprocessed(RemoteImage {
            url: "missing.png".into(),
            description: String::new(),
        }),
    );
    theme
        .colors
        .insert("#FF0000".into(), Paint::solid(Rgba::new(1.0, 0.0, 0.0, 1.0)));
    theme
        .colors
        .insert("#00000000".into(), Paint::solid(Rgba::new(0.0, 0.0, 0.0, 0.0)));
    let fetcher = MapFetcher(HashMap::from([("hero.png".to_string(), bytes.clone())]));

    let screens = vec![screen(theme.clone()), screen(theme)];
    let assets =
        resolve_download_assets(&mut canvas, &screens, &ImageCache::default(), &fetcher).await;

    let hero = assets["hero"].as_handle().unwrap();
    assert_eq!(canvas.image_bytes(hero), Some(bytes.as_slice()));
    assert!(!assets.contains_key("broken"));

    let red = canvas.variable(assets["#FF0000"].as_handle().unwrap()).unwrap();
    assert_eq!(red.name, "Color-#FF0000");
    let clear = canvas.variable(assets["#00000000"].as_handle().unwrap()).unwrap();
    assert_eq!(clear.value.a, 1.0);

    // A second pass reuses the variables by name.
    let again =
        resolve_download_assets(&mut canvas, &screens, &ImageCache::default(), &fetcher).await;
    assert_eq!(again["#FF0000"], assets["#FF0000"]);
    assert!(canvas.collection_by_name(COLOR_COLLECTION).is_some());
}
