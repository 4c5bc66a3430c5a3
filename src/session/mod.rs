//! Host-level flows: extract a selection, draw downloaded screens, upload and generate.
//!
//! A [`Context`] carries what the flows share between calls (settings, the notification slot,
//! the image cache, the fetcher and the pacer). Flows report progress and failures through the
//! notifier; extraction failures also focus the offending node.

pub(crate) mod notify;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assets::{ImageCache, ImageFetcher, collect_upload_assets, resolve_download_assets};
use crate::canvas::{Canvas, NativeKind, NodeId, Viewport};
use crate::config::Settings;
use crate::extract::Extractor;
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::document::{App, Epoch, Screen};
use crate::model::node::WorldviewNode;
use crate::render::{Pacer, RenderOutcome, TokioPacer, draw_roots};
use crate::theme::extract_screen;
use crate::transport::{
    DownloadRequest, DownloadResponse, GenerationService, TransportError, UploadOutcome,
    apply_upload_response,
};

pub use self::notify::{
    ERROR_TIMEOUT_MS, INFO_TIMEOUT_MS, Notification, NotificationLevel, Notifier,
};

const SELECT_SECTION: &str = "Ensure you selected a section and try again";
const TITLE_SECTION: &str = "Ensure sections are titled: \"Name - Description\" and try again";
const SELECT_FRAME: &str = "Ensure you selected a frame and try again";
const EMPTY_PROMPT: &str = "Please enter a prompt and try again";
const GENERATED: &str = "Generated!";

/// Zoom the viewport is set to before drawing and when focusing a node.
pub const DRAW_ZOOM: f64 = 0.5;

/// State shared by every flow of a [`Session`].
pub struct Context {
    pub settings: Settings,
    pub notifier: Notifier,
    pub images: ImageCache,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub pacer: Arc<dyn Pacer>,
}

impl Context {
    pub fn new(settings: Settings, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            settings,
            notifier: Notifier::new(),
            images: ImageCache::default(),
            fetcher,
            pacer: Arc::new(TokioPacer),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_images(mut self, images: ImageCache) -> Self {
        self.images = images;
        self
    }
}

pub struct Session {
    ctx: Context,
}

impl Session {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn notifier(&self) -> &Notifier {
        &self.ctx.notifier
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    /// Extract the selected section as a single-app epoch.
    ///
    /// Exactly one section titled `"Name - Description"` must be selected. Returns `None` after
    /// notifying when the selection is wrong or extraction fails.
    #[tracing::instrument(skip_all)]
    pub fn extract_selection(&mut self, canvas: &mut Canvas) -> Option<Epoch> {
        let section = match canvas.selection() {
            [id] if canvas.node(*id).is_some_and(|n| n.kind == NativeKind::Section) => *id,
            _ => {
                self.ctx.notifier.notify(SELECT_SECTION);
                return None;
            }
        };
        let title = canvas.node(section)?.name.clone();
        let Some((name, description)) = split_title(&title) else {
            self.ctx.notifier.notify(TITLE_SECTION);
            return None;
        };

        let screens = match extract_section(canvas, section) {
            Ok(screens) => screens,
            Err(e) => {
                self.report(canvas, e);
                return None;
            }
        };
        tracing::info!(app = name, screens = screens.len(), "extracted selection");
        Some(Epoch {
            name: unix_millis().to_string(),
            apps: vec![App {
                meta: serde_json::Map::new(),
                name: name.to_string(),
                description: description.to_string(),
                screens,
            }],
        })
    }

    /// Extract one frame as a themed screen.
    #[tracing::instrument(skip_all, fields(frame = %frame))]
    pub fn extract_frame(&mut self, canvas: &mut Canvas, frame: NodeId) -> Option<Screen> {
        if !canvas.node(frame).is_some_and(|n| n.kind == NativeKind::Frame) {
            self.ctx.notifier.notify(SELECT_FRAME);
            return None;
        }
        let extracted = Extractor::new(canvas).extract_container(frame);
        match extracted {
            Ok(root) => Some(extract_screen(&root)),
            Err(e) => {
                self.report(canvas, e);
                None
            }
        }
    }

    /// Draw the screens of the epoch's first app without asset bindings.
    pub async fn draw_epoch(&mut self, canvas: &mut Canvas, epoch: &Epoch) -> RenderOutcome {
        let roots: Vec<WorldviewNode> = epoch
            .apps
            .first()
            .map(|app| app.screens.iter().map(|s| s.root.clone()).collect())
            .unwrap_or_default();
        zoom_out(canvas);
        let settings = self.ctx.settings.render_settings(None);
        let outcome = draw_roots(canvas, &roots, &settings, self.ctx.pacer.as_ref()).await;
        self.ctx.notifier.notify(GENERATED);
        outcome
    }

    /// Bind the response's images and colors, then draw every screen.
    pub async fn draw_download(
        &mut self,
        canvas: &mut Canvas,
        response: &DownloadResponse,
    ) -> RenderOutcome {
        zoom_out(canvas);
        let assets = resolve_download_assets(
            canvas,
            &response.screens,
            &self.ctx.images,
            self.ctx.fetcher.as_ref(),
        )
        .await;
        let settings = self.ctx.settings.render_settings(Some(assets));
        let roots: Vec<WorldviewNode> = response.screens.iter().map(|s| s.root.clone()).collect();
        let outcome = draw_roots(canvas, &roots, &settings, self.ctx.pacer.as_ref()).await;
        self.ctx.notifier.notify(GENERATED);
        outcome
    }

    /// Extract the selection, upload its images, then upload the epoch itself.
    ///
    /// `Ok(None)` means the selection could not be extracted; the user has been notified.
    #[tracing::instrument(skip_all)]
    pub async fn upload_selection(
        &mut self,
        canvas: &mut Canvas,
        service: &dyn GenerationService,
    ) -> Result<Option<UploadOutcome>, TransportError> {
        self.ctx
            .notifier
            .notify_for("Uploading selection...", None);
        let Some(mut epoch) = self.extract_selection(canvas) else {
            return Ok(None);
        };
        let assets = match collect_upload_assets(
            canvas,
            epoch.screens(),
            &self.ctx.images,
            self.ctx.fetcher.as_ref(),
        )
        .await
        {
            Ok(assets) => assets,
            Err(e) => {
                self.report(canvas, e);
                return Ok(None);
            }
        };

        let uploaded = self.transport(service.upload_assets(&assets).await)?;
        let images_rewritten = apply_upload_response(&mut epoch, &uploaded);
        let created = self.transport(service.upload_epoch(&epoch).await)?;

        let outcome = UploadOutcome {
            collection_id: created.collection_id,
            images_rewritten,
        };
        self.ctx.notifier.notify(outcome.message());
        Ok(Some(outcome))
    }

    /// Ask the service for screens matching `prompt` and draw them.
    ///
    /// `Ok(None)` means the prompt was empty.
    #[tracing::instrument(skip_all)]
    pub async fn generate(
        &mut self,
        canvas: &mut Canvas,
        service: &dyn GenerationService,
        prompt: &str,
    ) -> Result<Option<RenderOutcome>, TransportError> {
        if prompt.trim().is_empty() {
            self.ctx.notifier.notify_error(EMPTY_PROMPT);
            return Ok(None);
        }
        self.ctx.notifier.notify_for(
            format!("Generating {}...", serde_json::Value::from(prompt)),
            None,
        );
        let request = DownloadRequest::new(prompt, &self.ctx.settings);
        let response = self.transport(service.download(&request).await)?;
        Ok(Some(self.draw_download(canvas, &response).await))
    }

    fn transport<T>(&mut self, result: Result<T, TransportError>) -> Result<T, TransportError> {
        result.inspect_err(|e| {
            self.ctx.notifier.notify_error(e.to_string());
        })
    }

    fn report(&mut self, canvas: &mut Canvas, err: WorldviewError) {
        match err {
            WorldviewError::Extract(e) => {
                self.ctx.notifier.notify_error(e.reason.to_string());
                canvas.focus(e.node);
            }
            other => {
                self.ctx.notifier.notify_error(other.to_string());
            }
        }
    }
}

/// Extract every frame-like or boolean-operation child of `section`, top to bottom, then left
/// to right, as one themed screen each. Other children are skipped.
pub fn extract_section(canvas: &mut Canvas, section: NodeId) -> WorldviewResult<Vec<Screen>> {
    let mut children = canvas
        .children(section)
        .iter()
        .map(|id| canvas.get(*id).map(|n| (n.y, n.x, n.kind, *id)))
        .collect::<WorldviewResult<Vec<_>>>()?;
    children.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut extractor = Extractor::new(canvas);
    let mut screens = Vec::with_capacity(children.len());
    for (_, _, kind, id) in children {
        let root = match kind {
            k if k.is_frame_like() => extractor.extract_container(id)?,
            NativeKind::BooleanOperation => extractor.extract_boolean_operation(id)?,
            other => {
                tracing::debug!(node = %id, kind = %other, "section child skipped");
                continue;
            }
        };
        screens.push(extract_screen(&root));
    }
    Ok(screens)
}

/// `"Name - Description"` into its two halves.
fn split_title(title: &str) -> Option<(&str, &str)> {
    let mut parts = title.split(" - ");
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(description), None) => Some((name, description)),
        _ => None,
    }
}

fn zoom_out(canvas: &mut Canvas) {
    canvas.set_viewport(Viewport {
        zoom: DRAW_ZOOM,
        ..canvas.viewport()
    });
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/session/mod.rs"]
mod tests;
