//! Boundary to the remote generation and storage service.
//!
//! The crate ships no HTTP client. Callers implement [`GenerationService`] over whatever
//! transport they have, and use the `parse_*` helpers to turn a status code and body into a
//! typed response or a [`TransportError`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::model::document::{Assets, Epoch, ImageAsset, RemoteImage, Screen};

/// Failure classes surfaced to the user. Each one has its own message.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error. Please try again later")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("Bad request. Please try again later")]
    BadRequest(String),

    #[error("Forbidden. Please try again later")]
    Forbidden,

    #[error("Unprocessable entity. Please try again later")]
    UnprocessableEntity,

    #[error("Server error. Please try again later")]
    ServerError,

    #[error("Internal error. Please try again later")]
    Internal(u16),
}

impl TransportError {
    /// HTTP status this error was classified from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Forbidden => Some(403),
            Self::UnprocessableEntity => Some(422),
            Self::ServerError => Some(503),
            Self::Internal(status) => Some(*status),
            Self::Network(_) | Self::BadRequest(_) => None,
        }
    }
}

/// Accept any 2xx status; map the rest onto an error class.
pub fn classify_status(status: u16) -> Result<(), TransportError> {
    match status {
        200..=299 => Ok(()),
        403 => Err(TransportError::Forbidden),
        422 => Err(TransportError::UnprocessableEntity),
        503 => Err(TransportError::ServerError),
        other => Err(TransportError::Internal(other)),
    }
}

/// Body sent to ask the service for a generated app.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub prompt: String,
    pub temperature: f64,
    pub threshold: f64,
}

impl DownloadRequest {
    pub fn new(prompt: impl Into<String>, settings: &Settings) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: settings.temperature,
            threshold: settings.threshold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub screens: Vec<Screen>,
}

/// Remote location for each uploaded asset key.
pub type UploadAssetsResponse = BTreeMap<String, RemoteImage>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEpochResponse {
    pub collection_id: String,
}

/// Result of a completed upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub collection_id: String,
    /// Image theme entries rewritten to point at uploaded assets.
    pub images_rewritten: usize,
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        format!("Success! Created {}", self.collection_id)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!("response failed validation: {e}");
        TransportError::BadRequest(e.to_string())
    })
}

/// Only `200` carries screens; any other success status is treated as an internal error.
pub fn parse_download_response(status: u16, body: &str) -> Result<DownloadResponse, TransportError> {
    match status {
        200 => parse_body(body),
        other => {
            classify_status(other)?;
            Err(TransportError::Internal(other))
        }
    }
}

pub fn parse_upload_assets_response(
    status: u16,
    body: &str,
) -> Result<UploadAssetsResponse, TransportError> {
    classify_status(status)?;
    parse_body(body)
}

pub fn parse_upload_epoch_response(
    status: u16,
    body: &str,
) -> Result<UploadEpochResponse, TransportError> {
    classify_status(status)?;
    parse_body(body)
}

/// Point image theme entries at their uploaded copies.
///
/// Every entry whose key the response names becomes `POSTPROCESSED`, in every screen of every
/// app. Returns the number of entries rewritten.
pub fn apply_upload_response(epoch: &mut Epoch, response: &UploadAssetsResponse) -> usize {
    let mut rewritten = 0;
    for screen in epoch.screens_mut() {
        for (key, image) in screen.meta.theme.images.iter_mut() {
            if let Some(remote) = response.get(key) {
                *image = ImageAsset::Postprocessed(remote.clone());
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Remote service that stores uploaded epochs and generates new screens.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn upload_assets(&self, assets: &Assets) -> Result<UploadAssetsResponse, TransportError>;

    async fn upload_epoch(&self, epoch: &Epoch) -> Result<UploadEpochResponse, TransportError>;

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadResponse, TransportError>;
}

#[cfg(test)]
#[path = "../../tests/unit/transport/mod.rs"]
mod tests;
