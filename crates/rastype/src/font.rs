//! The font facade: open, configure, measure, render
//!
//! [`Font`] binds a face to a size and a bag of settings, and owns the
//! raster cache those settings feed. Rendering and measuring take `&self`
//! since the cache handles its own locking; setters take `&mut self` and
//! flush the cache when they change anything pixel-shaping.
//!
//! Sizes follow the usual point convention: a glyph's pixel height is
//! `pt * vdpi / 72`, so at the default 72 dpi points and pixels coincide.

use std::path::Path;
use std::sync::Arc;

use rastype_core::cache::CacheMetrics;
use rastype_core::error::{RenderError, Result, ShapeError};
use rastype_core::{
    Color, Direction, FaceRef, GlyphId, GlyphMetrics, Hinting, ShapeOptions, ShapedGlyph,
    ShapedRun, Shaper, Style, Surface, WrapAlign,
};
use rastype_face::Face;
#[cfg(feature = "complex")]
use rastype_shape::HarfrustShaper;
#[cfg(not(feature = "complex"))]
use rastype_shape::SimpleShaper;

use crate::cache::{GlyphCache, GlyphKey, PHASE_BUCKETS};
use crate::raster::{self, RasterGlyph, RasterParams};
use crate::render::{self, RenderMode};

/// How much of a string fits in a width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Pen advance of the fitting prefix, pixels
    pub extent: i32,
    /// Number of characters that fit
    pub count: usize,
}

/// A sized, configured font ready to shape and render text
pub struct Font {
    face: Arc<Face>,
    shaper: Box<dyn Shaper>,
    pt_size: f32,
    hdpi: u32,
    vdpi: u32,
    px_x: f32,
    px_y: f32,
    style: Style,
    outline: u32,
    hinting: Hinting,
    kerning: bool,
    sdf: bool,
    wrap_align: WrapAlign,
    direction: Direction,
    script: Option<[u8; 4]>,
    cache: GlyphCache,
}

impl Font {
    /// Resolution that makes one point exactly one pixel
    pub const DEFAULT_DPI: u32 = 72;

    /// Opens the first face in a font file at the given point size.
    pub fn open(path: impl AsRef<Path>, pt_size: f32) -> Result<Self> {
        Self::open_index(path, 0, pt_size)
    }

    /// Opens a face by its index inside a collection file.
    pub fn open_index(path: impl AsRef<Path>, face_index: u32, pt_size: f32) -> Result<Self> {
        let face = Arc::new(Face::from_file_index(path, face_index)?);
        Ok(Self::from_face(face, pt_size))
    }

    /// Wraps an already loaded face. The `Arc` lets several fonts share
    /// one face at different sizes or styles.
    pub fn from_face(face: Arc<Face>, pt_size: f32) -> Self {
        Self::from_face_dpi(face, pt_size, Self::DEFAULT_DPI, Self::DEFAULT_DPI)
    }

    /// Like [`from_face`](Self::from_face) with explicit target resolution.
    /// A zero dpi on either axis falls back to [`Self::DEFAULT_DPI`].
    pub fn from_face_dpi(face: Arc<Face>, pt_size: f32, hdpi: u32, vdpi: u32) -> Self {
        #[cfg(feature = "complex")]
        let shaper: Box<dyn Shaper> = Box::new(HarfrustShaper::new());
        #[cfg(not(feature = "complex"))]
        let shaper: Box<dyn Shaper> = Box::new(SimpleShaper::new());

        let mut font = Self {
            face,
            shaper,
            pt_size: 0.0,
            hdpi: 0,
            vdpi: 0,
            px_x: 0.0,
            px_y: 0.0,
            style: Style::NORMAL,
            outline: 0,
            hinting: Hinting::default(),
            kerning: true,
            sdf: false,
            wrap_align: WrapAlign::default(),
            direction: Direction::default(),
            script: None,
            cache: GlyphCache::new(),
        };
        font.apply_size(pt_size, hdpi, vdpi);
        font
    }

    /// Changes the point size, resetting dpi scaling to the default.
    pub fn set_size(&mut self, pt_size: f32) {
        self.apply_size(pt_size, Self::DEFAULT_DPI, Self::DEFAULT_DPI);
    }

    /// Changes the point size and target resolution together.
    pub fn set_size_dpi(&mut self, pt_size: f32, hdpi: u32, vdpi: u32) {
        self.apply_size(pt_size, hdpi, vdpi);
    }

    fn apply_size(&mut self, pt_size: f32, hdpi: u32, vdpi: u32) {
        let hdpi = if hdpi == 0 { Self::DEFAULT_DPI } else { hdpi };
        let vdpi = if vdpi == 0 { Self::DEFAULT_DPI } else { vdpi };
        self.pt_size = pt_size;
        self.hdpi = hdpi;
        self.vdpi = vdpi;
        self.px_x = pt_size * hdpi as f32 / 72.0;
        self.px_y = pt_size * vdpi as f32 / 72.0;
        self.cache.flush();
        log::debug!(
            "font size {}pt at {}x{} dpi -> {:.1}x{:.1} px/em",
            pt_size,
            hdpi,
            vdpi,
            self.px_x,
            self.px_y
        );
    }

    pub fn pt_size(&self) -> f32 {
        self.pt_size
    }

    pub fn dpi(&self) -> (u32, u32) {
        (self.hdpi, self.vdpi)
    }

    /// Pixels per em on each axis at the current size and dpi
    pub fn px_per_em(&self) -> (f32, f32) {
        (self.px_x, self.px_y)
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Sets the style flags. Only bold and italic changes flush the
    /// cache; underline and strikethrough are drawn at composite time.
    pub fn set_style(&mut self, style: Style) {
        if style.raster_bits() != self.style.raster_bits() {
            self.cache.flush();
        }
        self.style = style;
    }

    pub fn outline(&self) -> u32 {
        self.outline
    }

    /// Sets the outline ring radius in pixels, 0 for plain fills.
    pub fn set_outline(&mut self, outline: u32) {
        if outline != self.outline {
            self.cache.flush();
        }
        self.outline = outline;
    }

    pub fn hinting(&self) -> Hinting {
        self.hinting
    }

    pub fn set_hinting(&mut self, hinting: Hinting) {
        if hinting != self.hinting {
            self.cache.flush();
        }
        self.hinting = hinting;
    }

    pub fn kerning(&self) -> bool {
        self.kerning
    }

    /// Toggles pair kerning during shaping. Cached masks stay valid since
    /// kerning only moves glyphs.
    pub fn set_kerning(&mut self, kerning: bool) {
        self.kerning = kerning;
    }

    pub fn sdf(&self) -> bool {
        self.sdf
    }

    /// Toggles signed-distance-field rendering for the blended tier.
    pub fn set_sdf(&mut self, sdf: bool) {
        if sdf != self.sdf {
            self.cache.flush();
        }
        self.sdf = sdf;
    }

    pub fn wrap_align(&self) -> WrapAlign {
        self.wrap_align
    }

    pub fn set_wrap_align(&mut self, align: WrapAlign) {
        self.wrap_align = align;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn script(&self) -> Option<[u8; 4]> {
        self.script
    }

    /// Sets the ISO 15924 script tag guiding the shaper, e.g. `"Arab"`.
    pub fn set_script(&mut self, tag: &str) -> Result<()> {
        self.script = Some(parse_script_tag(tag)?);
        Ok(())
    }

    // Face passthroughs

    /// Number of faces in the file this font came from
    pub fn faces(&self) -> u32 {
        self.face.face_count()
    }

    pub fn is_fixed_width(&self) -> bool {
        self.face.is_fixed_pitch()
    }

    pub fn family_name(&self) -> Option<&str> {
        self.face.family_name()
    }

    pub fn style_name(&self) -> Option<&str> {
        self.face.style_name()
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.face.has_glyph(ch)
    }

    pub fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        self.face.glyph_index(ch)
    }

    // Scaled metrics

    fn scale_x(&self) -> f32 {
        self.px_x / f32::from(self.face.units_per_em().max(1))
    }

    fn scale_y(&self) -> f32 {
        self.px_y / f32::from(self.face.units_per_em().max(1))
    }

    /// Pixels from the baseline up to the typographic top
    pub fn ascent(&self) -> i32 {
        (f32::from(self.face.metrics().ascender) * self.scale_y()).ceil() as i32
    }

    /// Pixels from the baseline down to the typographic bottom, negative
    pub fn descent(&self) -> i32 {
        (f32::from(self.face.metrics().descender) * self.scale_y()).floor() as i32
    }

    /// Height of one rendered line, ascent minus descent
    pub fn height(&self) -> i32 {
        self.ascent() - self.descent()
    }

    /// Baseline-to-baseline distance in a multi-line render
    pub fn line_skip(&self) -> i32 {
        let m = self.face.metrics();
        let units = i32::from(m.ascender) - i32::from(m.descender) + i32::from(m.line_gap);
        (units as f32 * self.scale_y()).ceil() as i32
    }

    /// Ink box and advance of one character at the current settings.
    pub fn glyph_metrics(&self, ch: char) -> Result<GlyphMetrics> {
        let glyph_id = self
            .face
            .glyph_index(ch)
            .ok_or(RenderError::GlyphNotFound(ch as u32))?;
        let raster = self.raster_glyph(GlyphKey::base(glyph_id))?;
        Ok(raster.metrics)
    }

    /// Kern adjustment between two characters in pixels, regardless of
    /// whether kerning is enabled for shaping. Unmapped characters kern
    /// by zero.
    pub fn kerning_size(&self, previous: char, current: char) -> i32 {
        let (Some(left), Some(right)) = (
            self.face.glyph_index(previous),
            self.face.glyph_index(current),
        ) else {
            return 0;
        };
        match self.face.kern_pair(left, right) {
            Some(units) => (f32::from(units) * self.scale_x()).round() as i32,
            None => 0,
        }
    }

    // Measuring

    /// Pixel dimensions `(w, h)` of `text` rendered as a single line
    ///
    /// The width covers ink that overhangs the pen travel (italics,
    /// outlines, negative bearings). Vertical flows report the line
    /// height as width and the total advance as height.
    pub fn size(&self, text: &str) -> Result<(i32, i32)> {
        let run = self.shape_text(text)?;
        if self.direction.is_vertical() {
            return Ok((self.height(), run.advance_height.ceil() as i32));
        }

        let mut pen = 0.0f32;
        let mut min_edge = 0.0f32;
        let mut max_edge = 0.0f32;
        for shaped in &run.glyphs {
            let gx = pen + shaped.x_offset;
            let raster = self.raster_glyph(GlyphKey::base(shaped.id))?;
            if !raster.is_blank() {
                min_edge = min_edge.min(gx + raster.metrics.min_x as f32);
                max_edge = max_edge.max(gx + raster.metrics.max_x as f32);
            }
            pen += shaped.x_advance;
        }
        max_edge = max_edge.max(pen);
        let width = (max_edge.ceil() - min_edge.floor()) as i32;
        Ok((width, self.height()))
    }

    /// How many characters of `text` fit in `measure_width` pixels of pen
    /// travel. A width of zero or less means no limit.
    pub fn measure(&self, text: &str, measure_width: i32) -> Result<Measurement> {
        let run = self.shape_text(text)?;
        let vertical = self.direction.is_vertical();

        // Walk in logical order so the first glyph past the limit names
        // the first character that does not fit
        let reversed = matches!(
            self.direction,
            Direction::RightToLeft | Direction::BottomToTop
        );
        let logical: Vec<&ShapedGlyph> = if reversed {
            run.glyphs.iter().rev().collect()
        } else {
            run.glyphs.iter().collect()
        };

        let mut pen = 0.0f32;
        let mut extent = 0i32;
        let mut consumed = text.len();
        for shaped in logical {
            let step = if vertical {
                -shaped.y_advance
            } else {
                shaped.x_advance
            };
            let next = pen + step;
            if measure_width > 0 && next.ceil() as i32 > measure_width {
                consumed = shaped.cluster as usize;
                break;
            }
            pen = next;
            extent = pen.ceil() as i32;
        }
        let count = text[..consumed].chars().count();
        Ok(Measurement { extent, count })
    }

    // Rendering

    /// Binary-coverage render on a keyed 8-bit palette surface.
    pub fn render_solid(&self, text: &str, fg: Color) -> Result<Surface> {
        render::render_line(self, text, &RenderMode::Solid { fg })
    }

    /// Solid render wrapped to a pixel width (0 wraps on newlines only).
    pub fn render_solid_wrapped(&self, text: &str, fg: Color, wrap_width: u32) -> Result<Surface> {
        render::render_wrapped(self, text, wrap_width, &RenderMode::Solid { fg })
    }

    /// Solid render of a single character.
    pub fn render_glyph_solid(&self, ch: char, fg: Color) -> Result<Surface> {
        render::render_glyph(self, ch, &RenderMode::Solid { fg })
    }

    /// Antialiased render on an 8-bit surface ramping from `bg` to `fg`.
    pub fn render_shaded(&self, text: &str, fg: Color, bg: Color) -> Result<Surface> {
        render::render_line(self, text, &RenderMode::Shaded { fg, bg })
    }

    /// Shaded render wrapped to a pixel width.
    pub fn render_shaded_wrapped(
        &self,
        text: &str,
        fg: Color,
        bg: Color,
        wrap_width: u32,
    ) -> Result<Surface> {
        render::render_wrapped(self, text, wrap_width, &RenderMode::Shaded { fg, bg })
    }

    /// Shaded render of a single character.
    pub fn render_glyph_shaded(&self, ch: char, fg: Color, bg: Color) -> Result<Surface> {
        render::render_glyph(self, ch, &RenderMode::Shaded { fg, bg })
    }

    /// Antialiased render to 32-bit ARGB with a full alpha channel.
    pub fn render_blended(&self, text: &str, fg: Color) -> Result<Surface> {
        render::render_line(self, text, &RenderMode::Blended { fg })
    }

    /// Blended render wrapped to a pixel width.
    pub fn render_blended_wrapped(
        &self,
        text: &str,
        fg: Color,
        wrap_width: u32,
    ) -> Result<Surface> {
        render::render_wrapped(self, text, wrap_width, &RenderMode::Blended { fg })
    }

    /// Blended render of a single character.
    pub fn render_glyph_blended(&self, ch: char, fg: Color) -> Result<Surface> {
        render::render_glyph(self, ch, &RenderMode::Blended { fg })
    }

    /// Subpixel render to opaque 32-bit ARGB over a background color.
    pub fn render_lcd(&self, text: &str, fg: Color, bg: Color) -> Result<Surface> {
        render::render_line(self, text, &RenderMode::Lcd { fg, bg })
    }

    /// Subpixel render wrapped to a pixel width.
    pub fn render_lcd_wrapped(
        &self,
        text: &str,
        fg: Color,
        bg: Color,
        wrap_width: u32,
    ) -> Result<Surface> {
        render::render_wrapped(self, text, wrap_width, &RenderMode::Lcd { fg, bg })
    }

    /// Subpixel render of a single character.
    pub fn render_glyph_lcd(&self, ch: char, fg: Color, bg: Color) -> Result<Surface> {
        render::render_glyph(self, ch, &RenderMode::Lcd { fg, bg })
    }

    /// Raster cache counters for this font
    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    // Plumbing shared with the render module

    fn shape_options(&self) -> ShapeOptions {
        ShapeOptions {
            px_per_em_x: self.px_x,
            px_per_em_y: self.px_y,
            direction: self.direction,
            script: self.script,
            kerning: self.kerning,
        }
    }

    pub(crate) fn shape_text(&self, text: &str) -> Result<ShapedRun> {
        Ok(self
            .shaper
            .shape(text, self.face.as_ref(), &self.shape_options())?)
    }

    pub(crate) fn raster_glyph(
        &self,
        key: GlyphKey,
    ) -> std::result::Result<Arc<RasterGlyph>, RenderError> {
        let params = self.raster_params(key);
        self.cache
            .get_or_build(key, || raster::rasterize(&self.face, key.glyph_id, &params))
    }

    fn raster_params(&self, key: GlyphKey) -> RasterParams {
        RasterParams {
            px_x: self.px_x,
            px_y: self.px_y,
            embolden: self.style.contains(Style::BOLD) && !self.face.is_bold(),
            italicize: self.style.contains(Style::ITALIC) && !self.face.is_italic(),
            outline: self.outline,
            hinting: self.hinting,
            phase: f32::from(key.phase) / f32::from(PHASE_BUCKETS),
            lcd: key.lcd,
            sdf: key.sdf,
        }
    }

    /// Underline band as (top row within the line box, thickness)
    pub(crate) fn underline_band(&self) -> (i32, i32) {
        let m = self.face.metrics();
        let sy = self.scale_y();
        let offset = (f32::from(m.underline_position) * sy).round() as i32;
        let thickness = ((f32::from(m.underline_thickness) * sy).round() as i32).max(1);
        (self.ascent() - offset, thickness)
    }

    /// Strikethrough band as (top row within the line box, thickness)
    pub(crate) fn strike_band(&self) -> (i32, i32) {
        let m = self.face.metrics();
        let sy = self.scale_y();
        let offset = (f32::from(m.strikeout_position) * sy).round() as i32;
        let thickness = ((f32::from(m.strikeout_size) * sy).round() as i32).max(1);
        (self.ascent() - offset, thickness)
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family_name())
            .field("pt_size", &self.pt_size)
            .field("px_per_em", &(self.px_x, self.px_y))
            .field("style", &self.style)
            .field("shaper", &self.shaper.name())
            .finish()
    }
}

fn parse_script_tag(tag: &str) -> std::result::Result<[u8; 4], ShapeError> {
    let bytes = tag.as_bytes();
    if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(ShapeError::InvalidScript(tag.to_string()));
    }
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_tags_must_be_four_ascii_letters() {
        assert_eq!(parse_script_tag("Latn").unwrap(), *b"Latn");
        assert_eq!(parse_script_tag("arab").unwrap(), *b"arab");
        assert!(parse_script_tag("La").is_err());
        assert!(parse_script_tag("Latin").is_err());
        assert!(parse_script_tag("La1n").is_err());
        assert!(parse_script_tag("").is_err());

        match parse_script_tag("nope!") {
            Err(ShapeError::InvalidScript(tag)) => assert_eq!(tag, "nope!"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
