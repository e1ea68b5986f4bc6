//! Rastype - font rasterization for people who just want pixels
//!
//! Open a font, pick a size, hand over a string, get a surface back.
//! Underneath sits a full pipeline (face parsing via read-fonts/skrifa,
//! shaping via harfrust, rasterization via zeno, an LRU mask cache), but
//! [`Font`] is the only type most callers ever touch.
//!
//! # Render tiers
//!
//! Four quality/cost points, each in plain and wrapped and single-glyph
//! flavors:
//!
//! - **Solid**: binary coverage on a color-keyed 8-bit palette surface.
//!   The fastest path and the ugliest.
//! - **Shaded**: antialiased against a fixed background color, 8-bit
//!   palette ramp.
//! - **Blended**: antialiased with a real alpha channel, 32-bit ARGB.
//!   What you want for compositing. Optionally renders signed distance
//!   fields instead of plain coverage.
//! - **Lcd**: subpixel-filtered for horizontal RGB stripes, opaque
//!   32-bit ARGB.
//!
//! # Example
//!
//! ```ignore
//! use rastype::{Color, Font, Style};
//!
//! let mut font = Font::open("DejaVuSans.ttf", 24.0)?;
//! font.set_style(Style::BOLD);
//! let surface = font.render_blended("Hello, world", Color::black())?;
//! let png = rastype_export::PngExporter::new().export(&surface)?;
//! ```
//!
//! # Feature flags
//!
//! - `complex` (default): full OpenType shaping through harfrust. Without
//!   it a simple cmap-plus-kerning shaper stands in, which is fine for
//!   Latin-like scripts and much smaller.

mod cache;
mod font;
mod layout;
mod raster;
mod render;
mod sdf;

pub use font::{Font, Measurement};
pub use rastype_core::{
    error, Color, Direction, Exporter, FaceRef, GlyphId, GlyphMetrics, Hinting, Palette,
    PixelLayout, ShapeOptions, ShapedGlyph, ShapedRun, Shaper, Style, Surface, WrapAlign,
};
pub use rastype_core::error::{Error, Result};
pub use rastype_face::{DesignMetrics, Face};
#[cfg(feature = "complex")]
pub use rastype_shape::HarfrustShaper;
pub use rastype_shape::SimpleShaper;

/// Common imports for typical usage
pub mod prelude {
    pub use crate::font::{Font, Measurement};
    pub use rastype_core::error::{Error, Result};
    pub use rastype_core::{Color, Direction, Hinting, Style, Surface, WrapAlign};
    pub use rastype_face::Face;
}

/// The crate version, useful for logs and diagnostics
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
