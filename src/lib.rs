//! Worldview is a bidirectional transcoder between a design-canvas scene graph and the portable
//! Worldview document format.
//!
//! # Pipeline overview
//!
//! 1. **Extract**: native subtree -> [`WorldviewNode`] tree ([`Extractor`])
//! 2. **Theme**: literal paints and text -> theme-keyed variables ([`ThemeExtractor`], [`Screen`])
//! 3. **Render**: [`WorldviewNode`] tree -> native nodes, optionally paced ([`draw_roots`])
//! 4. **Link**: reaction destinations rewritten to the freshly created native ids
//!    ([`link_reactions`])
//!
//! The host canvas is modelled in-process by [`Canvas`], so both directions run (and are tested)
//! without a design tool attached. [`Session`] wraps the pipeline in the host-level flows:
//! extracting a selection, uploading it, and drawing generated screens.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Strict extraction**: ambiguous native values abort with an [`ExtractError`] naming the node.
//! - **Best-effort rendering**: one failing node, image or font never aborts a batch.
#![forbid(unsafe_code)]

mod assets;
mod canvas;
mod config;
mod extract;
mod foundation;
mod link;
mod model;
mod render;
mod roundtrip;
mod session;
mod theme;
mod transport;

pub use assets::{
    COLOR_COLLECTION, DEFAULT_IMAGE_CACHE_CAPACITY, FsFetcher, ImageCache, ImageFetcher,
    collect_upload_assets, color_variable_name, resolve_download_assets,
};
pub use canvas::snapshot::{CanvasSnapshot, LoadedCanvas, SnapshotNode, ViewportSnapshot};
pub use canvas::{
    Canvas, ColorVariable, FontBook, Mixed, NativeBlur, NativeEffect, NativeImage, NativeKind,
    NativeLayout, NativePaint, NativePaintKind, NativeRadii, NativeShadow, NativeSolid,
    NativeTextCase, NodeId, SceneNode, ShapeProps, StrokeWeights, TextProps, VariableCollection,
    VectorGeometry, Viewport,
};
pub use config::{MAX_TIMEOUT_MS, Settings};
pub use extract::{ExtractWarning, Extractor, ICON_MAX_SIZE, extract_node, is_icon_like};
pub use foundation::core::{Origin, Rgb, Rgba, Transform2x3, Vector};
pub use foundation::error::{ExtractError, ExtractErrorKind, WorldviewError, WorldviewResult};
pub use link::{LinkReport, link_reactions};
pub use model::document::{
    App, AssetPayload, Assets, Epoch, ImageAsset, RemoteImage, Screen, ScreenMeta, Theme,
};
pub use model::effect::{Effect, Shadow};
pub use model::layout::{
    BooleanOperationKind, CornerRadii, CounterAxisAlign, EdgeWeights, Layout, LayoutMode,
    LayoutPositioning, PrimaryAxisAlign,
};
pub use model::node::{
    BooleanOperationNode, ContainerNode, EllipseNode, GroupNode, IconContainerNode, LineNode,
    NodeBase, PolygonNode, StarNode, TextNode, VectorNode, VoidContainerNode, WorldviewKind,
    WorldviewNode,
};
pub use model::paint::{
    ColorStop, GradientKind, GradientPaint, ImagePaint, Paint, ScaleMode, SolidPaint,
};
pub use model::reaction::{Action, Reaction};
pub use model::text::{
    DEFAULT_FONT_FAMILY, FontName, LengthUnit, LetterSpacing, LineHeight, TextAlignHorizontal,
    TextAlignVertical, TextCase, Truncation, style_for_weight,
};
pub use model::value::{Indirect, IndirectKind};
pub use model::vector::{
    VectorNetwork, VectorPath, VectorRegion, VectorSegment, VectorVertex, WindingRule,
};
pub use render::{
    IdMapping, NoPacing, Pacer, ROOT_GAP, RecordingPacer, RenderOutcome, RenderSettings, Renderer,
    TokioPacer, draw_node, draw_roots, root_origin,
};
pub use roundtrip::{RoundTrip, restore_ids, roundtrip};
pub use session::{
    Context, DRAW_ZOOM, ERROR_TIMEOUT_MS, INFO_TIMEOUT_MS, Notification, NotificationLevel,
    Notifier, Session, extract_section,
};
pub use theme::{ThemeExtractor, characters_key, color_hex, extract_screen, paint_key};
pub use transport::{
    DownloadRequest, DownloadResponse, GenerationService, TransportError, UploadAssetsResponse,
    UploadEpochResponse, UploadOutcome, apply_upload_response, classify_status,
    parse_download_response, parse_upload_assets_response, parse_upload_epoch_response,
};
