//! Region snapshots and the extractor that crops them from a rendered page.

use crate::coords::{
    CanvasGeometry, CanvasRect, ContainerRect, PageRect, canvas_rect_to_page,
    rect_to_canvas_intrinsic,
};
use crate::error::CaptureError;
use crate::raster::{EmbeddedImage, ImageFormat, RasterSurface, encode_png};
use serde::{Deserialize, Serialize};

/// A captured crop of a rendered page, as stored in the region memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: String,
    pub document_id: String,
    /// 1-based page the region was captured from.
    pub page_number: usize,
    /// Captured area in page space, independent of the zoom at capture time.
    pub rect: PageRect,
    pub image: EmbeddedImage,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// A snapshot that has not been recorded yet (no id, no timestamp).
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRegion {
    pub document_id: String,
    pub page_number: usize,
    pub rect: PageRect,
    pub image: EmbeddedImage,
}

/// Pixels cut out of a surface by [`capture`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRegion {
    /// Pixel-aligned crop rectangle on the source surface.
    pub canvas_rect: CanvasRect,
    /// The same rectangle in page space.
    pub page_rect: PageRect,
    /// PNG encoded crop.
    pub image: EmbeddedImage,
}

impl CapturedRegion {
    pub fn into_pending(self, document_id: impl Into<String>, page_number: usize) -> PendingRegion {
        PendingRegion {
            document_id: document_id.into(),
            page_number,
            rect: self.page_rect,
            image: self.image,
        }
    }
}

/// Crop the part of `source` under a container-space selection.
///
/// `geometry` must describe how `source` is currently displayed, and `scale` is
/// the scale `source` was rendered at. Reads nothing else and changes nothing.
pub fn capture(
    rect: ContainerRect,
    source: &RasterSurface,
    geometry: &CanvasGeometry,
    scale: f64,
) -> Result<CapturedRegion, CaptureError> {
    if source.is_empty() {
        return Err(CaptureError::EmptySurface(source.width(), source.height()));
    }

    let mapped = rect_to_canvas_intrinsic(rect, geometry)?;
    let (x, y, width, height) = pixel_bounds(mapped, source).ok_or(CaptureError::DegenerateRegion)?;

    let crop = source
        .crop(x, y, width, height)
        .ok_or(CaptureError::DegenerateRegion)?;
    let png = encode_png(&crop).map_err(|e| CaptureError::Encode(e.to_string()))?;

    let canvas_rect = CanvasRect::new(x as f64, y as f64, width as f64, height as f64);
    let page_rect = canvas_rect_to_page(canvas_rect, scale)?;

    log::debug!(
        "Captured {}x{} px at ({}, {}), {} bytes",
        width,
        height,
        x,
        y,
        png.len()
    );

    Ok(CapturedRegion {
        canvas_rect,
        page_rect,
        image: EmbeddedImage::new(ImageFormat::Png, width, height, &png),
    })
}

/// Round a canvas rect to whole pixels and clip it to the surface.
fn pixel_bounds(rect: CanvasRect, surface: &RasterSurface) -> Option<(u32, u32, u32, u32)> {
    let max_x = surface.width() as f64;
    let max_y = surface.height() as f64;
    let x0 = rect.left.round().clamp(0.0, max_x);
    let y0 = rect.top.round().clamp(0.0, max_y);
    let x1 = (rect.left + rect.width).round().clamp(0.0, max_x);
    let y1 = (rect.top + rect.height).round().clamp(0.0, max_y);
    if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}
