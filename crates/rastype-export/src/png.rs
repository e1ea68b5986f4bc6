//! PNG export format
//!
//! Encodes surfaces to PNG through the `image` crate. Every layout goes
//! through [`Surface::to_rgba8`] first, so a paletted surface keeps its
//! color key as real transparency in the file.

use image::{ImageBuffer, ImageEncoder, RgbaImage};
use rastype_core::error::ExportError;
use rastype_core::{Exporter, Surface};

/// Encode tightly packed RGBA pixels as a PNG file.
///
/// Returns a valid PNG with IHDR, IDAT, and IEND chunks, default
/// compression, Sub row filter.
fn encode_rgba_to_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>, ExportError> {
    let img: RgbaImage = ImageBuffer::from_raw(width, height, rgba).ok_or_else(|| {
        ExportError::Encoding(format!("pixel buffer does not match {}x{} surface", width, height))
    })?;

    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut png_data,
        image::codecs::png::CompressionType::Default,
        image::codecs::png::FilterType::Sub,
    );

    encoder
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ExportError::Encoding(format!("PNG encoding failed: {}", e)))?;

    Ok(png_data)
}

/// PNG exporter for rendered surfaces
///
/// # Examples
///
/// ```
/// use rastype_export::PngExporter;
/// let exporter = PngExporter::new();
/// ```
pub struct PngExporter;

impl PngExporter {
    /// Create a new PNG exporter
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn export(&self, surface: &Surface) -> Result<Vec<u8>, ExportError> {
        encode_rgba_to_png(surface.width(), surface.height(), surface.to_rgba8())
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

impl Default for PngExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::{Color, Palette};

    const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_png_exporter_identity() {
        let exporter = PngExporter::new();
        assert_eq!(exporter.name(), "png");
        assert_eq!(exporter.extension(), "png");
        assert_eq!(exporter.mime_type(), "image/png");
    }

    #[test]
    fn test_png_export_argb_surface() {
        let mut surface = Surface::new_argb8888(2, 2).unwrap();
        surface.put_argb(0, 0, Color::rgb(255, 0, 0));
        surface.put_argb(1, 0, Color::rgb(0, 255, 0));
        surface.put_argb(0, 1, Color::rgb(0, 0, 255));
        surface.put_argb(1, 1, Color::white());

        let png_data = PngExporter::new().export(&surface).unwrap();
        assert_eq!(&png_data[0..8], &PNG_MAGIC);
        assert!(png_data.len() > 50, "2x2 PNG should carry real chunks");
    }

    #[test]
    fn test_png_export_paletted_surface() {
        let palette = Palette::new(vec![Color::white(), Color::black()]);
        let mut surface = Surface::new_index8(3, 1, palette, Some(0)).unwrap();
        surface.put_index(1, 0, 1);

        let png_data = PngExporter::new().export(&surface).unwrap();
        assert_eq!(&png_data[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_png_default() {
        let exporter = PngExporter::default();
        assert_eq!(exporter.name(), "png");
    }
}
