//! Text shaping engines for rastype
//!
//! Two implementations of the [`Shaper`](rastype_core::Shaper) contract
//! live here. [`SimpleShaper`] walks characters one by one through cmap
//! lookups and pair kerning, which is all Latin-like scripts need.
//! [`HarfrustShaper`] (behind the default `complex` feature) runs full
//! OpenType shaping through harfrust, a pure Rust port of HarfBuzz, and
//! handles ligatures, marks, and complex scripts like Arabic and
//! Devanagari.
//!
//! Both engines speak pixels: advances and offsets come back scaled to
//! the pixel-per-em values in [`ShapeOptions`](rastype_core::ShapeOptions),
//! so downstream code never sees font units.

#[cfg(feature = "complex")]
mod hr;
mod simple;

#[cfg(feature = "complex")]
pub use hr::HarfrustShaper;
pub use simple::SimpleShaper;
