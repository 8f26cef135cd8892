//! Application error type.

use lectern_core::{CaptureError, ChatRequestError, LoadError, SelectionRejected, StorageError};
use lectern_render::ExportError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a command can fail with.
///
/// Wrapped causes are reachable through `source()`; use [`AppError::report`]
/// for the whole chain.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error when reading `{0}`")]
    ConfigIo(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("IO error when writing `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("IO error when reading library `{0}`")]
    Library(PathBuf, #[source] std::io::Error),

    #[error("Failed to write output")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Page {page} out of range (1..={total})")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Page {0} could not be rendered")]
    NotRendered(usize),

    #[error(transparent)]
    Selection(#[from] SelectionRejected),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Region storage error")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Chat(#[from] ChatRequestError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("No remembered region with id {0}")]
    UnknownRegion(String),
}

impl AppError {
    /// The error and all of its causes on one line.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
