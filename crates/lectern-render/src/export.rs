//! Writing rendered surfaces to disk.

use lectern_core::RasterSurface;
use std::path::Path;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Surface is empty")]
    EmptySurface,
    #[error("Surface buffer does not match {0}x{1}")]
    InvalidSurface(u32, u32),
    #[error("Image error")]
    Image(#[from] image::ImageError),
}

/// Save a surface to `path`. The format follows the file extension.
pub fn save_surface(surface: &RasterSurface, path: &Path) -> Result<(), ExportError> {
    if surface.is_empty() {
        return Err(ExportError::EmptySurface);
    }
    let (width, height) = (surface.width(), surface.height());
    let buffer = image::RgbaImage::from_raw(width, height, surface.pixels().to_vec())
        .ok_or(ExportError::InvalidSurface(width, height))?;
    buffer.save(path)?;
    log::info!("Saved {}x{} page to {}", width, height, path.display());
    Ok(())
}
