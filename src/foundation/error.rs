use std::fmt;

use crate::canvas::node::{NativeKind, NodeId};

pub type WorldviewResult<T> = Result<T, WorldviewError>;

#[derive(thiserror::Error, Debug)]
pub enum WorldviewError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("render error: {0}")]
    Render(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WorldviewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Extraction failure pinned to the native node that caused it.
///
/// The caller is expected to report the message and focus `node` so the user can fix it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractError {
    pub node: NodeId,
    pub reason: ExtractErrorKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExtractErrorKind {
    MixedFills,
    MixedStrokeWeight,
    MissingImageHash,
    UnsupportedKind(NativeKind),
    SvgExport(String),
}

impl ExtractError {
    pub fn new(node: NodeId, reason: ExtractErrorKind) -> Self {
        Self { node, reason }
    }
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MixedFills => f.write_str("fills are mixed"),
            Self::MixedStrokeWeight => f.write_str("stroke weight is mixed"),
            Self::MissingImageHash => f.write_str("image paint has no image hash"),
            Self::UnsupportedKind(kind) => write!(f, "unsupported node type: {kind}"),
            Self::SvgExport(msg) => write!(f, "SVG failed to export: {msg}"),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (node {})", self.reason, self.node)
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
