//! Raster surfaces and portable image payloads.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// An RGBA8 pixel buffer, row-major, no padding.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// Bytes per pixel.
    pub const STRIDE: usize = 4;

    /// A transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * Self::STRIDE],
        }
    }

    /// Wrap existing RGBA8 data. Returns `None` if the length doesn't match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * Self::STRIDE {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A surface filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::STRIDE)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at (x, y), if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::STRIDE;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::STRIDE;
        self.pixels[i..i + Self::STRIDE].copy_from_slice(&rgba);
    }

    /// Copy a sub-rectangle into a new surface. The rectangle must lie inside
    /// this surface.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if x.checked_add(width)? > self.width || y.checked_add(height)? > self.height {
            return None;
        }
        let mut out = Vec::with_capacity(width as usize * height as usize * Self::STRIDE);
        let row_len = width as usize * Self::STRIDE;
        for row in y..y + height {
            let start = (row as usize * self.width as usize + x as usize) * Self::STRIDE;
            out.extend_from_slice(&self.pixels[start..start + row_len]);
        }
        Some(Self {
            width,
            height,
            pixels: out,
        })
    }
}

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }
}

/// Encoded image bytes kept as base64, ready to embed in JSON or a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub format: ImageFormat,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
    /// Image data as base64-encoded string.
    pub data_base64: String,
}

impl EmbeddedImage {
    pub fn new(format: ImageFormat, width: u32, height: u32, data: &[u8]) -> Self {
        Self {
            format,
            width,
            height,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }
}

/// Encode a surface as an 8-bit RGBA PNG.
pub fn encode_png(surface: &RasterSurface) -> Result<Vec<u8>, png::EncodingError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.pixels())?;
        writer.finish()?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterSurface {
        let mut surface = RasterSurface::new(width, height);
        for y in 0..height {
            for x in 0..width {
                surface.set_pixel(x, y, [x as u8, y as u8, 0, 255]);
            }
        }
        surface
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(RasterSurface::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(RasterSurface::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_crop_copies_rows() {
        let surface = gradient(10, 8);
        let crop = surface.crop(3, 2, 4, 5).unwrap();
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 5);
        assert_eq!(crop.pixel(0, 0), Some([3, 2, 0, 255]));
        assert_eq!(crop.pixel(3, 4), Some([6, 6, 0, 255]));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let surface = gradient(10, 8);
        assert!(surface.crop(8, 0, 3, 1).is_none());
        assert!(surface.crop(0, 0, 10, 8).is_some());
    }

    #[test]
    fn test_png_signature() {
        let png = encode_png(&gradient(3, 3)).unwrap();
        assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_data_url() {
        let image = EmbeddedImage::new(ImageFormat::Png, 1, 1, b"abc");
        let url = image.to_data_url();
        assert_eq!(url, "data:image/png;base64,YWJj");
        assert_eq!(image.data().unwrap(), b"abc");
    }
}
