//! Asset binding for the two directions of the pipeline.
//!
//! Upload gathers image bytes keyed by theme key. Download turns theme images and colors into
//! canvas handles the renderer can bind to.

pub(crate) mod cache;
pub(crate) mod resolve;

pub use cache::{DEFAULT_IMAGE_CACHE_CAPACITY, FsFetcher, ImageCache, ImageFetcher};
pub use resolve::{
    COLOR_COLLECTION, collect_upload_assets, color_variable_name, resolve_download_assets,
};
