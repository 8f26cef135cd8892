//! Error kinds surfaced by the engine.
//!
//! Boundary failures (document engine, raster, storage) are translated into one
//! of these at the component entry point.

use crate::coords::MappingError;
use thiserror::Error;

/// Document fetch or decode failure. Shown to the user, never retried.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Failed to fetch document {id}: {reason}")]
    Fetch { id: String, reason: String },
    #[error("Failed to decode document {id}: {reason}")]
    Decode { id: String, reason: String },
    #[error("Document {0} has no pages")]
    Empty(String),
}

/// Rasterization failure. Logged; the previous page stays on screen.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("No document loaded")]
    NoDocument,
    #[error("Page {page} out of range (1..={total})")]
    PageOutOfRange { page: usize, total: usize },
    #[error("Rasterization failed: {0}")]
    Raster(String),
    #[error("Raster size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}

/// Text overlay build failure. Degrades to a fallback placeholder.
#[derive(Debug, Clone, Error)]
pub enum TextLayerError {
    #[error("Text content unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed text content: {0}")]
    Malformed(String),
}

/// A drag too small to count as a selection. Never surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Selection {width:.0}x{height:.0} is below the {min:.0}px threshold")]
pub struct SelectionRejected {
    pub width: f64,
    pub height: f64,
    pub min: f64,
}

/// Snapshot capture failure. Shown to the user; nothing is recorded.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Source surface is empty ({0}x{1})")]
    EmptySurface(u32, u32),
    #[error("Selected region is empty after mapping to the page")]
    DegenerateRegion,
    #[error("Coordinate mapping failed: {0}")]
    Mapping(#[from] MappingError),
    #[error("Image encoding failed: {0}")]
    Encode(String),
    #[error("Nothing is rendered")]
    NothingRendered,
}

/// Storage read/write failure. Logged; the in-memory state stays authoritative.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("Failed to read region memory: {0}")]
    Read(String),
    #[error("Failed to write region memory: {0}")]
    Write(String),
    #[error("Failed to remove region memory: {0}")]
    Remove(String),
}
