//! The contracts that bind the rendering stages together
//!
//! Three seams, three traits. A [`FaceRef`] is the window into one font's
//! data and lookups, a [`Shaper`] turns characters into positioned glyphs
//! against any face, and an [`Exporter`] serializes finished surfaces.
//! Everything is `Send + Sync` so fonts and shapers can be shared across
//! threads behind an `Arc`.

use crate::error::{ExportError, ShapeError};
use crate::surface::Surface;
use crate::{GlyphId, ShapeOptions, ShapedRun};

/// Your window into one font face
///
/// The lookups every shaper needs, answered in font units. Implementations
/// wrap a parsed font file; the raw bytes stay available for engines that
/// parse the file themselves.
pub trait FaceRef: Send + Sync {
    /// Raw font bytes as they live in the file
    fn data(&self) -> &[u8];

    /// Which face within the file, 0 for single-font files
    fn face_index(&self) -> u32;

    /// The font's internal coordinate system scale
    fn units_per_em(&self) -> u16;

    /// Find the glyph that represents this character
    ///
    /// Returns None when the font does not map this character.
    fn glyph_index(&self, ch: char) -> Option<GlyphId>;

    /// Horizontal advance of a glyph in font units
    fn advance_width(&self, glyph: GlyphId) -> f32;

    /// Pair kerning between two glyphs in font units, if the font defines it
    fn kerning(&self, _left: GlyphId, _right: GlyphId) -> Option<f32> {
        None
    }

    /// How many glyphs this face contains
    fn glyph_count(&self) -> Option<u32> {
        None
    }

    /// Default vertical advance in font units, for flows without real
    /// vertical metrics
    fn vertical_advance(&self) -> f32 {
        self.units_per_em() as f32
    }
}

/// Where characters learn their positions
pub trait Shaper: Send + Sync {
    /// Identify yourself in logs and error messages
    fn name(&self) -> &'static str;

    /// Transform characters into positioned glyphs
    fn shape(
        &self,
        text: &str,
        face: &dyn FaceRef,
        options: &ShapeOptions,
    ) -> Result<ShapedRun, ShapeError>;
}

/// The final step: pixels become files
pub trait Exporter: Send + Sync {
    /// Who are you?
    fn name(&self) -> &'static str;

    /// Encode the surface as bytes in this exporter's format
    fn export(&self, surface: &Surface) -> Result<Vec<u8>, ExportError>;

    /// What file extension should be used?
    fn extension(&self) -> &'static str;

    /// What MIME type identifies your format?
    fn mime_type(&self) -> &'static str;
}
