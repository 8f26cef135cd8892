//! Paged document sources.
//!
//! The engine never parses documents itself; it talks to a document engine
//! through these traits. Handles are reference counted on a single thread.

use crate::coords::PageRect;
use crate::error::{LoadError, RenderError, TextLayerError};
use crate::raster::RasterSurface;
use crate::storage::BoxFuture;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A run of text positioned on a page, in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub text: String,
    pub rect: PageRect,
}

/// Opens documents by identifier.
pub trait DocumentSource {
    /// Fetch and decode a document.
    fn open(&self, id: &str) -> BoxFuture<'_, Result<Rc<dyn PagedDocument>, LoadError>>;
}

/// An opened, paginated document.
///
/// Page numbers are 1-based.
pub trait PagedDocument {
    /// Identifier the document was opened with.
    fn id(&self) -> &str;

    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Native size of a page at scale 1.0.
    fn page_size(&self, page: usize) -> Option<Size>;

    /// Rasterize a page at `scale` into exactly `width` x `height` pixels.
    fn rasterize(
        &self,
        page: usize,
        scale: f64,
        width: u32,
        height: u32,
    ) -> BoxFuture<'_, Result<RasterSurface, RenderError>>;

    /// Extract positioned text for the selectable overlay.
    fn text_content(&self, page: usize) -> BoxFuture<'_, Result<Vec<TextItem>, TextLayerError>>;

    /// Release engine resources. Called before another document is opened.
    fn close(&self) {}
}

/// Pixel size of the raster for a page of `page_size` at `scale`.
///
/// Fractional pixels are truncated; a page never rasterizes smaller than 1x1.
pub fn canvas_size_for(page_size: Size, scale: f64) -> (u32, u32) {
    let w = (page_size.width * scale).floor().max(1.0);
    let h = (page_size.height * scale).floor().max(1.0);
    (w as u32, h as u32)
}
