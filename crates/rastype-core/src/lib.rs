//! Rastype Core: the vocabulary every other crate speaks
//!
//! Text rendering moves data through three hands: a face hands glyphs to a
//! shaper, the shaper hands positioned glyphs to a rasterizer, and the
//! rasterizer hands pixels to whoever asked. This crate defines the types
//! those hands exchange, the traits that let each hand be swapped out, the
//! error tree that failures travel through, and a small two-level cache for
//! the data worth keeping warm.
//!
//! Nothing in here touches font files or pixels itself. The types are plain,
//! cheap to clone where cloning is expected, and `Send + Sync` where they
//! cross thread boundaries.

pub mod cache;
pub mod error;
pub mod surface;
pub mod traits;

pub use error::{Error, ExportError, FaceError, RenderError, Result, ShapeError};
pub use surface::{Palette, PixelLayout, Surface};
pub use traits::{Exporter, FaceRef, Shaper};

/// Unique identifier for a glyph within a font
pub type GlyphId = u32;

/// Simple RGBA color that works everywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgba(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::rgba(255, 255, 255, 255)
    }
}

bitflags::bitflags! {
    /// Type style applied on top of whatever the face itself provides
    ///
    /// Bold and italic are synthesized at rasterization time when the face
    /// is not already bold or italic. Underline and strikethrough are drawn
    /// over the finished text, so toggling them never invalidates cached
    /// glyph masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Style: u32 {
        const NORMAL = 0x00;
        const BOLD = 0x01;
        const ITALIC = 0x02;
        const UNDERLINE = 0x04;
        const STRIKETHROUGH = 0x08;
    }
}

impl Style {
    /// The bits that change glyph masks and therefore invalidate caches
    pub fn raster_bits(self) -> Style {
        self & (Style::BOLD | Style::ITALIC)
    }
}

/// How outlines are adjusted for small-size legibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hinting {
    #[default]
    Normal = 0,
    Light = 1,
    /// Hard black-and-white coverage, no antialiasing
    Mono = 2,
    None = 3,
    /// Keeps fractional pen positions instead of snapping to whole pixels
    LightSubpixel = 4,
}

/// Which way the text flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    LeftToRight = 0,
    RightToLeft = 1,
    TopToBottom = 2,
    BottomToTop = 3,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }
}

/// Horizontal placement of lines inside a wrapped render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapAlign {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Pixel-space extents of a single glyph, y-up relative to the baseline
///
/// `min_x`/`max_x` bound the inked region horizontally, `min_y`/`max_y`
/// vertically (positive above the baseline). `advance` is how far the pen
/// moves afterwards. All values are rounded outward to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub advance: i32,
}

/// A glyph that knows exactly where it belongs
///
/// Advances and offsets are in pixels, y-up. `cluster` is the byte offset
/// of the originating character in the shaped string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub id: GlyphId,
    pub cluster: u32,
    pub x_advance: f32,
    pub y_advance: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// What emerges after shaping: glyphs positioned and ready to rasterize
#[derive(Debug, Clone)]
pub struct ShapedRun {
    pub glyphs: Vec<ShapedGlyph>,
    pub direction: Direction,
    /// Sum of horizontal advances, pixels
    pub advance_width: f32,
    /// Sum of vertical advances, pixels (nonzero only for vertical flows)
    pub advance_height: f32,
}

impl ShapedRun {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// How shaping should behave
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOptions {
    /// Horizontal pixels per em at the requested size and DPI
    pub px_per_em_x: f32,
    /// Vertical pixels per em at the requested size and DPI
    pub px_per_em_y: f32,
    pub direction: Direction,
    /// ISO 15924 script tag, e.g. `*b"Latn"`. None lets the engine guess.
    pub script: Option<[u8; 4]>,
    /// Apply pair kerning between glyphs
    pub kerning: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            px_per_em_x: 16.0,
            px_per_em_y: 16.0,
            direction: Direction::LeftToRight,
            script: None,
            kerning: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_flag_values_match_their_wire_encoding() {
        assert_eq!(Style::NORMAL.bits(), 0x00);
        assert_eq!(Style::BOLD.bits(), 0x01);
        assert_eq!(Style::ITALIC.bits(), 0x02);
        assert_eq!(Style::UNDERLINE.bits(), 0x04);
        assert_eq!(Style::STRIKETHROUGH.bits(), 0x08);

        let styled = Style::BOLD | Style::UNDERLINE;
        assert!(styled.contains(Style::BOLD));
        assert!(!styled.contains(Style::ITALIC));
        assert_eq!(styled.bits(), 0x05);
    }

    #[test]
    fn raster_bits_ignore_decoration_flags() {
        let styled = Style::BOLD | Style::UNDERLINE | Style::STRIKETHROUGH;
        assert_eq!(styled.raster_bits(), Style::BOLD);
        assert_eq!(Style::UNDERLINE.raster_bits(), Style::NORMAL);
    }

    #[test]
    fn direction_vertical_split() {
        assert!(!Direction::LeftToRight.is_vertical());
        assert!(!Direction::RightToLeft.is_vertical());
        assert!(Direction::TopToBottom.is_vertical());
        assert!(Direction::BottomToTop.is_vertical());
    }

    #[test]
    fn color_constructors() {
        assert_eq!(Color::rgb(1, 2, 3), Color::rgba(1, 2, 3, 255));
        assert_eq!(Color::black().a, 255);
        assert_eq!(Color::white(), Color::rgba(255, 255, 255, 255));
    }
}
