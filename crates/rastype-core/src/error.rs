//! Error types for rastype
//!
//! Every fallible operation returns [`Result`]. The per-concern enums roll
//! up into [`Error`] via `#[from]`, so `?` works across crate boundaries
//! and callers can still match on the concern that actually failed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rastype
#[derive(Debug, Error)]
pub enum Error {
    #[error("Face loading failed: {0}")]
    Face(#[from] FaceError),

    #[error("Shaping failed: {0}")]
    Shape(#[from] ShapeError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Face loading and font-table errors
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data: {0}")]
    InvalidData(String),

    #[error("Face index {index} out of range, file holds {count} face(s)")]
    FaceIndex { index: u32, count: u32 },

    #[error("Font is missing required table: {0}")]
    MissingTable(&'static str),
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Invalid script tag: {0:?} (want 4 characters, e.g. \"Latn\")")]
    InvalidScript(String),

    #[error("Shaping engine error: {0}")]
    Backend(String),
}

/// Rasterization and compositing errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Text has zero width")]
    ZeroWidth,

    #[error("Font has no glyph for U+{0:04X}")]
    GlyphNotFound(u32),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Glyph raster {width}x{height} exceeds the per-glyph size limit")]
    SizeOverflow { width: u32, height: u32 },

    #[error("Vertical text cannot be wrapped")]
    UnsupportedDirection,

    #[error("Outline extraction failed for glyph {glyph_id}: {reason}")]
    Outline { glyph_id: u32, reason: String },
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Pixel layout not supported by {0} export")]
    UnsupportedLayout(&'static str),

    #[error("No exporter handles {0:?} output")]
    UnknownFormat(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_their_context_in_display() {
        let err = RenderError::ZeroWidth;
        assert_eq!(err.to_string(), "Text has zero width");

        let err = FaceError::FaceIndex { index: 3, count: 1 };
        assert!(err.to_string().contains("index 3"));
        assert!(err.to_string().contains("1 face(s)"));

        let err = RenderError::GlyphNotFound(0x1F600);
        assert!(err.to_string().contains("U+1F600"));

        let err = ExportError::UnsupportedLayout("svg");
        assert!(err.to_string().contains("svg"));
    }

    #[test]
    fn sub_errors_convert_into_the_top_level_error() {
        fn render_fail() -> Result<()> {
            Err(RenderError::ZeroWidth)?
        }
        match render_fail() {
            Err(Error::Render(RenderError::ZeroWidth)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
