//! Lectern Render Library
//!
//! A paged document engine backed by page image files, plus PNG export of
//! rendered surfaces.

mod export;
mod image_source;

pub use export::{ExportError, save_surface};
pub use image_source::{ImageDocument, ImageDocumentSource, TEXT_SIDECAR_SUFFIX};
