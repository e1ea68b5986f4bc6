//! Surface exporters
//!
//! Two ways to get a rendered [`Surface`] out of the process: PNG through
//! the `image` crate for anything real, and ASCII portable anymaps (PBM,
//! PGM, PPM) when you want output you can read in a pager or diff in a
//! test. Every exporter flattens the surface through
//! [`Surface::to_rgba8`], so palettes and color keys are already resolved
//! by the time bytes are written.

use std::io::Write;

use rastype_core::error::ExportError;
use rastype_core::Surface;

pub mod png;

pub use png::PngExporter;
pub use rastype_core::Exporter;

/// Which portable anymap flavor to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmFormat {
    /// P1, black and white
    Pbm,
    /// P2, grayscale
    Pgm,
    /// P3, full color
    Ppm,
}

impl PnmFormat {
    fn magic(self) -> &'static str {
        match self {
            PnmFormat::Pbm => "P1",
            PnmFormat::Pgm => "P2",
            PnmFormat::Ppm => "P3",
        }
    }
}

/// ASCII portable anymap exporter
///
/// PNM has no alpha, so transparent and translucent pixels flatten over
/// white before conversion. PGM reduces color through the usual
/// luminance weights; PBM thresholds that luminance at half.
pub struct PnmExporter {
    format: PnmFormat,
}

impl PnmExporter {
    pub fn new(format: PnmFormat) -> Self {
        Self { format }
    }

    /// Color P3 output
    pub fn ppm() -> Self {
        Self::new(PnmFormat::Ppm)
    }

    /// Grayscale P2 output
    pub fn pgm() -> Self {
        Self::new(PnmFormat::Pgm)
    }

    /// Black-and-white P1 output
    pub fn pbm() -> Self {
        Self::new(PnmFormat::Pbm)
    }

    fn write_document(&self, out: &mut Vec<u8>, surface: &Surface) -> std::io::Result<()> {
        writeln!(out, "{}", self.format.magic())?;
        writeln!(out, "{} {}", surface.width(), surface.height())?;
        if self.format != PnmFormat::Pbm {
            writeln!(out, "255")?;
        }
        self.write_pixels(out, surface)
    }

    fn write_pixels(&self, out: &mut Vec<u8>, surface: &Surface) -> std::io::Result<()> {
        let rgba = surface.to_rgba8();
        let width = surface.width() as usize;

        for row in rgba.chunks_exact(width * 4) {
            for px in row.chunks_exact(4) {
                let (r, g, b) = flatten_over_white(px[0], px[1], px[2], px[3]);
                match self.format {
                    PnmFormat::Ppm => write!(out, "{} {} {} ", r, g, b)?,
                    PnmFormat::Pgm => write!(out, "{} ", luminance(r, g, b))?,
                    PnmFormat::Pbm => {
                        // PBM counts 1 as black
                        let bit = u8::from(luminance(r, g, b) < 128);
                        write!(out, "{} ", bit)?;
                    }
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Exporter for PnmExporter {
    fn name(&self) -> &'static str {
        match self.format {
            PnmFormat::Pbm => "pbm",
            PnmFormat::Pgm => "pgm",
            PnmFormat::Ppm => "ppm",
        }
    }

    fn export(&self, surface: &Surface) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        self.write_document(&mut out, surface)
            .map_err(|err| ExportError::Encoding(err.to_string()))?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        match self.format {
            PnmFormat::Pbm => "pbm",
            PnmFormat::Pgm => "pgm",
            PnmFormat::Ppm => "ppm",
        }
    }

    fn mime_type(&self) -> &'static str {
        match self.format {
            PnmFormat::Pbm => "image/x-portable-bitmap",
            PnmFormat::Pgm => "image/x-portable-graymap",
            PnmFormat::Ppm => "image/x-portable-pixmap",
        }
    }
}

fn flatten_over_white(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8) {
    if a == 255 {
        return (r, g, b);
    }
    let over = |c: u8| -> u8 {
        let c = u32::from(c) * u32::from(a) / 255;
        (c + (255 - u32::from(a))) as u8
    };
    (over(r), over(g), over(b))
}

/// Rec. 601 luminance
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::{Color, Palette};

    fn tiny_argb() -> Surface {
        let mut surface = Surface::new_argb8888(2, 1).unwrap();
        surface.put_argb(0, 0, Color::rgb(255, 0, 0));
        // (1, 0) stays fully transparent
        surface
    }

    #[test]
    fn ppm_header_and_sample_count() {
        let data = PnmExporter::ppm().export(&tiny_argb()).unwrap();
        let text = String::from_utf8(data).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("2 1"));
        assert_eq!(lines.next(), Some("255"));

        let samples: Vec<&str> = text.lines().nth(3).unwrap().split_whitespace().collect();
        assert_eq!(samples, ["255", "0", "0", "255", "255", "255"]);
    }

    #[test]
    fn pgm_reduces_to_luminance() {
        let data = PnmExporter::pgm().export(&tiny_argb()).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert!(text.starts_with("P2\n2 1\n255\n"));
        // Red has luminance 76; the transparent pixel flattens to white
        assert_eq!(
            text.lines().nth(3).unwrap().split_whitespace().collect::<Vec<_>>(),
            ["76", "255"]
        );
    }

    #[test]
    fn pbm_is_ink_one_paper_zero() {
        let palette = Palette::new(vec![Color::white(), Color::black()]);
        let mut surface = Surface::new_index8(2, 1, palette, None).unwrap();
        surface.put_index(0, 0, 1);

        let data = PnmExporter::pbm().export(&surface).unwrap();
        let text = String::from_utf8(data).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P1"));
        assert_eq!(lines.next(), Some("2 1"));
        assert_eq!(
            lines.next().unwrap().split_whitespace().collect::<Vec<_>>(),
            ["1", "0"]
        );
    }

    #[test]
    fn exporter_identity() {
        assert_eq!(PnmExporter::ppm().name(), "ppm");
        assert_eq!(PnmExporter::pgm().extension(), "pgm");
        assert_eq!(PnmExporter::pbm().mime_type(), "image/x-portable-bitmap");
    }
}
