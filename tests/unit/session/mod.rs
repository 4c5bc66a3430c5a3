use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::canvas::{Mixed, NativePaint};
use crate::foundation::core::Rgb;
use crate::model::document::{Assets, ImageAsset, RemoteImage};
use crate::model::paint::ScaleMode;
use crate::model::value::Indirect;
use crate::render::NoPacing;
use crate::transport::{UploadAssetsResponse, UploadEpochResponse};

struct NoFetcher;

#[async_trait]
impl ImageFetcher for NoFetcher {
    async fn fetch(&self, url: &str) -> WorldviewResult<Vec<u8>> {
        Err(WorldviewError::asset(format!("offline: {url}")))
    }
}

#[derive(Default)]
struct FakeService {
    fail_download: Option<TransportError>,
    screens: Vec<Screen>,
    uploaded_assets: Mutex<Option<Assets>>,
    uploaded_epoch: Mutex<Option<Epoch>>,
}

#[async_trait]
impl GenerationService for FakeService {
    async fn upload_assets(&self, assets: &Assets) -> Result<UploadAssetsResponse, TransportError> {
        *self.uploaded_assets.lock().unwrap() = Some(assets.clone());
        Ok(assets
            .keys()
            .map(|key| {
                let remote = RemoteImage {
                    url: format!("https://cdn.test/{key}.png"),
                    description: "uploaded".into(),
                };
                (key.clone(), remote)
            })
            .collect())
    }

    async fn upload_epoch(&self, epoch: &Epoch) -> Result<UploadEpochResponse, TransportError> {
        *self.uploaded_epoch.lock().unwrap() = Some(epoch.clone());
        Ok(UploadEpochResponse {
            collection_id: "col-7".into(),
        })
    }

    async fn download(&self, _: &DownloadRequest) -> Result<DownloadResponse, TransportError> {
        match &self.fail_download {
            Some(e) => Err(e.clone()),
            None => Ok(DownloadResponse {
                screens: self.screens.clone(),
            }),
        }
    }
}

fn session() -> Session {
    let ctx = Context::new(Settings::default(), Arc::new(NoFetcher)).with_pacer(Arc::new(NoPacing));
    Session::new(ctx)
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, vec![10, 20, 30, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn section(canvas: &mut Canvas, title: &str) -> NodeId {
    let section = canvas.create_section();
    canvas.get_mut(section).unwrap().name = title.to_string();
    canvas.append_child(canvas.page(), section).unwrap();
    canvas.set_selection(vec![section]);
    section
}

fn screen_frame(canvas: &mut Canvas, parent: NodeId, name: &str, x: f64, y: f64) -> NodeId {
    let frame = canvas.create_frame();
    canvas.resize(frame, 120.0, 200.0).unwrap();
    let node = canvas.get_mut(frame).unwrap();
    node.name = name.to_string();
    node.x = x;
    node.y = y;
    canvas.append_child(parent, frame).unwrap();
    frame
}

fn current_message(session: &Session) -> &str {
    &session.notifier().current().unwrap().message
}

#[test]
fn selection_must_be_a_single_section() {
    let mut canvas = Canvas::new();
    let mut session = session();
    assert!(session.extract_selection(&mut canvas).is_none());
    assert_eq!(current_message(&session), SELECT_SECTION);

    let frame = canvas.create_frame();
    canvas.set_selection(vec![frame]);
    assert!(session.extract_selection(&mut canvas).is_none());
    assert_eq!(current_message(&session), SELECT_SECTION);
}

#[test]
fn section_title_needs_name_and_description() {
    for title in ["Shop", "Shop - A - B", "Shop-A store"] {
        let mut canvas = Canvas::new();
        section(&mut canvas, title);
        let mut session = session();
        assert!(session.extract_selection(&mut canvas).is_none(), "{title}");
        assert_eq!(current_message(&session), TITLE_SECTION);
    }
}

#[test]
fn selection_becomes_one_app_of_themed_screens() {
    let mut canvas = Canvas::new();
    let parent = section(&mut canvas, "Shop - A small store");
    screen_frame(&mut canvas, parent, "Cart", 300.0, 0.0);
    screen_frame(&mut canvas, parent, "Checkout", 0.0, 500.0);
    screen_frame(&mut canvas, parent, "Home", 0.0, 0.0);
    let stray = canvas.create_rectangle();
    canvas.append_child(parent, stray).unwrap();

    let mut session = session();
    let epoch = session.extract_selection(&mut canvas).unwrap();

    assert!(epoch.name.parse::<u128>().is_ok());
    assert_eq!(epoch.apps.len(), 1);
    let app = &epoch.apps[0];
    assert_eq!(app.name, "Shop");
    assert_eq!(app.description, "A small store");
    assert!(app.meta.is_empty());
    let names: Vec<&str> = app.screens.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Home", "Cart", "Checkout"]);

    let home = &app.screens[0];
    assert!(home.meta.theme.colors.contains_key("#FFFFFF"));
    let WorldviewNode::Container(root) = &home.root else {
        panic!("expected a container root");
    };
    assert!(matches!(root.fill, Some(Indirect::Variable { .. })));
}

#[test]
fn extraction_failure_focuses_the_node() {
    let mut canvas = Canvas::new();
    let parent = section(&mut canvas, "Shop - Store");
    let frame = screen_frame(&mut canvas, parent, "Home", 0.0, 0.0);
    let bad = canvas.create_rectangle();
    canvas.get_mut(bad).unwrap().fills = Mixed::Mixed;
    canvas.append_child(frame, bad).unwrap();

    let mut session = session();
    assert!(session.extract_selection(&mut canvas).is_none());

    let shown = session.notifier().current().unwrap();
    assert_eq!(shown.level, NotificationLevel::Error);
    assert_eq!(shown.message, "fills are mixed");
    assert_eq!(canvas.selection(), [bad]);
    assert_eq!(canvas.viewport().zoom, DRAW_ZOOM);
}

#[test]
fn extract_frame_requires_a_frame() {
    let mut canvas = Canvas::new();
    let frame = canvas.create_frame();
    canvas.resize(frame, 300.0, 300.0).unwrap();
    canvas.get_mut(frame).unwrap().name = "Profile".into();
    let rect = canvas.create_rectangle();

    let mut session = session();
    let screen = session.extract_frame(&mut canvas, frame).unwrap();
    assert_eq!(screen.name, "Profile");
    assert!(session.extract_frame(&mut canvas, rect).is_none());
    assert_eq!(current_message(&session), SELECT_FRAME);
}

#[tokio::test]
async fn upload_rewrites_images_before_sending_the_epoch() {
    let mut canvas = Canvas::new();
    let parent = section(&mut canvas, "Gallery - Photos");
    let frame = screen_frame(&mut canvas, parent, "Home", 0.0, 0.0);
    let hash = canvas.create_image(&png_bytes()).unwrap();
    let photo = canvas.create_rectangle();
    canvas.get_mut(photo).unwrap().fills =
        Mixed::Value(vec![NativePaint::image(Some(hash.clone()), ScaleMode::Fill)]);
    canvas.append_child(frame, photo).unwrap();

    let service = FakeService::default();
    let mut session = session();
    let outcome = session
        .upload_selection(&mut canvas, &service)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.collection_id, "col-7");
    assert_eq!(outcome.images_rewritten, 1);
    assert_eq!(current_message(&session), "Success! Created col-7");

    let assets = service.uploaded_assets.lock().unwrap().clone().unwrap();
    assert_eq!(assets[&hash].as_bytes(), Some(png_bytes().as_slice()));
    let epoch = service.uploaded_epoch.lock().unwrap().clone().unwrap();
    let image = &epoch.apps[0].screens[0].meta.theme.images[&hash];
    assert!(matches!(image, ImageAsset::Postprocessed(remote) if remote.url.ends_with(".png")));
}

#[tokio::test]
async fn upload_stops_when_the_selection_is_wrong() {
    let mut canvas = Canvas::new();
    let service = FakeService::default();
    let mut session = session();
    assert_eq!(session.upload_selection(&mut canvas, &service).await, Ok(None));
    assert!(service.uploaded_assets.lock().unwrap().is_none());
}

#[tokio::test]
async fn generate_draws_downloaded_screens() {
    let mut source = Canvas::new();
    let frame = source.create_frame();
    source.resize(frame, 100.0, 80.0).unwrap();
    source.get_mut(frame).unwrap().fills = Mixed::Value(vec![NativePaint::solid(Rgb::BLACK, 1.0)]);
    let mut session = session();
    let screen = session.extract_frame(&mut source, frame).unwrap();

    let service = FakeService {
        screens: vec![screen],
        ..FakeService::default()
    };
    let mut canvas = Canvas::new();
    let outcome = session
        .generate(&mut canvas, &service, "make a test app")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.roots.len(), 1);
    let drawn = canvas.get(outcome.roots[0]).unwrap();
    assert_eq!((drawn.width, drawn.height), (100.0, 80.0));
    assert_eq!(canvas.viewport().zoom, DRAW_ZOOM);
    assert!(canvas.collection_by_name(crate::assets::COLOR_COLLECTION).is_some());

    let messages: Vec<&str> = session
        .notifier()
        .history()
        .iter()
        .map(|n| n.message.as_str())
        .collect();
    assert_eq!(messages, ["Generating \"make a test app\"...", "Generated!"]);
    assert_eq!(session.notifier().history()[0].timeout_ms, None);
}

#[tokio::test]
async fn generate_surfaces_transport_failures() {
    let service = FakeService {
        fail_download: Some(TransportError::ServerError),
        ..FakeService::default()
    };
    let mut canvas = Canvas::new();
    let mut session = session();
    let err = session
        .generate(&mut canvas, &service, "make a finance app")
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::ServerError);
    let shown = session.notifier().current().unwrap();
    assert_eq!(shown.level, NotificationLevel::Error);
    assert_eq!(shown.message, "Server error. Please try again later");
    assert_eq!(canvas.children(canvas.page()).len(), 0);
}

#[tokio::test]
async fn empty_prompt_is_refused() {
    let service = FakeService::default();
    let mut canvas = Canvas::new();
    let mut session = session();
    assert_eq!(session.generate(&mut canvas, &service, "  ").await, Ok(None));
    assert_eq!(current_message(&session), EMPTY_PROMPT);
}

#[tokio::test]
async fn draw_epoch_uses_the_first_app() {
    let mut source = Canvas::new();
    let frame = source.create_frame();
    source.resize(frame, 90.0, 90.0).unwrap();
    let mut session = session();
    let screen = session.extract_frame(&mut source, frame).unwrap();
    let epoch = Epoch {
        name: "1".into(),
        apps: vec![
            App {
                name: "first".into(),
                screens: vec![screen.clone(), screen.clone()],
                ..App::default()
            },
            App {
                name: "second".into(),
                screens: vec![screen],
                ..App::default()
            },
        ],
    };
    let mut canvas = Canvas::new();
    let outcome = session.draw_epoch(&mut canvas, &epoch).await;
    assert_eq!(outcome.roots.len(), 2);
    assert_eq!(current_message(&session), "Generated!");
}

#[test]
fn titles_split_on_the_spaced_dash() {
    assert_eq!(split_title("A - B"), Some(("A", "B")));
    assert_eq!(split_title("A - "), Some(("A", "")));
    assert_eq!(split_title("A-B"), None);
}
