//! Font file loading and face-level queries for rastype
//!
//! A [`Face`] owns the raw bytes of one font file and answers the questions
//! everything downstream keeps asking: which glyph draws this character, how
//! wide is it, where do underlines go. TTC collections are supported through
//! an explicit face index.
//!
//! ## Memory Management
//!
//! Faces store their raw data and create `FontRef` on-demand for parsing.
//! This avoids memory leaks from `Box::leak` and properly supports TTC
//! font collections with multiple faces.

mod kern;

use std::fs;
use std::path::Path;

use read_fonts::types::Tag;
use read_fonts::{FileRef, FontRef as ReadFontRef, TableProvider};
use skrifa::attribute::Style as AttributeStyle;
use skrifa::string::StringId;
use skrifa::MetadataProvider;

use rastype_core::error::{FaceError, Result};
use rastype_core::{FaceRef, GlyphId};

use crate::kern::KernTable;

/// Vertical layout numbers in font units, resolved once when a face opens
///
/// The OS/2 typographic fields win when present since they describe line
/// layout intent; hhea fills in for fonts without an OS/2 table, and a
/// proportional guess keeps degenerate fonts usable.
#[derive(Debug, Clone, Copy)]
pub struct DesignMetrics {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub strikeout_position: i16,
    pub strikeout_size: i16,
}

impl DesignMetrics {
    fn from_font(font: &ReadFontRef<'_>, units_per_em: u16) -> Self {
        let upem = units_per_em as i32;

        let (ascender, descender, line_gap) = match font.os2() {
            Ok(os2) => (
                os2.s_typo_ascender(),
                os2.s_typo_descender(),
                os2.s_typo_line_gap(),
            ),
            Err(_) => match font.hhea() {
                Ok(hhea) => (
                    hhea.ascender().to_i16(),
                    hhea.descender().to_i16(),
                    hhea.line_gap().to_i16(),
                ),
                Err(_) => ((upem * 3 / 4) as i16, -(upem / 4) as i16, 0),
            },
        };

        let (underline_position, underline_thickness) = match font.post() {
            Ok(post) => (
                post.underline_position().to_i16(),
                post.underline_thickness().to_i16(),
            ),
            Err(_) => ((descender / 2), (upem / 14) as i16),
        };

        let (strikeout_position, strikeout_size) = match font.os2() {
            Ok(os2) => (os2.y_strikeout_position(), os2.y_strikeout_size()),
            Err(_) => ((ascender as i32 * 2 / 5) as i16, (upem / 14) as i16),
        };

        // A zero-thickness line would vanish at small sizes
        let underline_thickness = underline_thickness.max(1);
        let strikeout_size = strikeout_size.max(1);

        Self {
            ascender,
            descender,
            line_gap,
            underline_position,
            underline_thickness,
            strikeout_position,
            strikeout_size,
        }
    }
}

/// A font face brought into memory, ready to answer glyph questions
///
/// Stores the raw font data and creates `FontRef` on-demand for parsing.
/// For TTC collections, `face_index` selects which face inside the file
/// this instance speaks for; `face_count` reports how many there are.
pub struct Face {
    data: Vec<u8>,
    face_index: u32,
    face_count: u32,
    units_per_em: u16,
    glyph_count: u32,
    metrics: DesignMetrics,
    family_name: Option<String>,
    style_name: Option<String>,
    bold: bool,
    italic: bool,
    fixed_pitch: bool,
    kern: Option<KernTable>,
}

impl Face {
    /// Opens a font file from disk and makes it usable
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_index(path, 0)
    }

    /// Opens a specific face from a font file (for TTC collections)
    pub fn from_file_index(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
        let data = fs::read(path.as_ref())
            .map_err(|_| FaceError::FileNotFound(path.as_ref().display().to_string()))?;

        Self::from_data_index(data, face_index)
    }

    /// Turns raw font bytes into something we can work with
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_index(data, 0)
    }

    /// Turns raw font bytes into a specific face (for TTC collections)
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        // Count the faces before picking one, so a bad index gets a clear
        // error instead of a generic parse failure
        let file_ref =
            FileRef::new(&data).map_err(|e| FaceError::InvalidData(e.to_string()))?;
        let face_count = match &file_ref {
            FileRef::Font(_) => 1,
            FileRef::Collection(collection) => collection.len(),
        };
        if face_index >= face_count {
            return Err(FaceError::FaceIndex {
                index: face_index,
                count: face_count,
            }
            .into());
        }

        let font_ref = ReadFontRef::from_index(&data, face_index)
            .map_err(|e| FaceError::InvalidData(e.to_string()))?;

        // Without a head table there is no coordinate system to scale from
        let units_per_em = font_ref
            .head()
            .map(|head| head.units_per_em())
            .map_err(|_| FaceError::MissingTable("head"))?;

        let glyph_count = font_ref
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or(0);

        let metrics = DesignMetrics::from_font(&font_ref, units_per_em);

        let attributes = font_ref.attributes();
        let bold = attributes.weight.value() >= 600.0;
        let italic = !matches!(attributes.style, AttributeStyle::Normal);

        let fixed_pitch = font_ref
            .post()
            .map(|post| post.is_fixed_pitch() != 0)
            .unwrap_or(false);

        let family_name = font_ref
            .localized_strings(StringId::FAMILY_NAME)
            .english_or_first()
            .map(|name| name.to_string());
        let style_name = font_ref
            .localized_strings(StringId::SUBFAMILY_NAME)
            .english_or_first()
            .map(|name| name.to_string());

        let kern = font_ref
            .table_data(Tag::new(b"kern"))
            .and_then(|table| KernTable::parse(table.as_bytes()));

        log::debug!(
            "Opened face {:?} ({} glyphs, {} upem, {} kern pairs)",
            family_name.as_deref().unwrap_or("<unnamed>"),
            glyph_count,
            units_per_em,
            kern.as_ref().map(KernTable::pair_count).unwrap_or(0)
        );

        Ok(Face {
            data,
            face_index,
            face_count,
            units_per_em,
            glyph_count,
            metrics,
            family_name,
            style_name,
            bold,
            italic,
            fixed_pitch,
            kern,
        })
    }

    /// How many faces live in the underlying file (1 unless it's a TTC)
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// Font-unit vertical metrics resolved at open time
    pub fn metrics(&self) -> &DesignMetrics {
        &self.metrics
    }

    /// The face's family name, when the font names itself
    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// The face's style name ("Regular", "Bold Italic", ...)
    pub fn style_name(&self) -> Option<&str> {
        self.style_name.as_deref()
    }

    /// Whether the face itself is designed bold (weight 600 and up)
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Whether the face itself is designed italic or oblique
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Whether every glyph advances by the same width
    pub fn is_fixed_pitch(&self) -> bool {
        self.fixed_pitch
    }

    /// Whether the face carries usable pair kerning
    pub fn has_kerning(&self) -> bool {
        self.kern.is_some()
    }

    /// Creates a FontRef on-demand for parsing operations
    fn font_ref(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::from_index(&self.data, self.face_index).ok()
    }

    /// Finds which glyph draws this character
    pub fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        self.font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch).map(|gid| gid.to_u32()))
    }

    /// Whether the face maps this character at all
    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyph_index(ch).is_some()
    }

    /// Horizontal advance for a glyph in font units
    pub fn advance_width(&self, glyph_id: GlyphId) -> f32 {
        self.font_ref()
            .and_then(|font| {
                let hmtx = font.hmtx().ok()?;

                use read_fonts::types::GlyphId as ReadGlyphId;
                let advance = hmtx.advance(ReadGlyphId::new(glyph_id))?;
                Some(advance as f32)
            })
            // Half an em reads better than zero when metrics are broken
            .unwrap_or(self.units_per_em as f32 / 2.0)
    }

    /// Pair kerning in font units from the legacy kern table
    pub fn kern_pair(&self, left: GlyphId, right: GlyphId) -> Option<i16> {
        self.kern.as_ref()?.lookup(left, right)
    }
}

impl FaceRef for Face {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn face_index(&self) -> u32 {
        self.face_index
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_index(&self, ch: char) -> Option<GlyphId> {
        self.glyph_index(ch)
    }

    fn advance_width(&self, glyph: GlyphId) -> f32 {
        self.advance_width(glyph)
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<f32> {
        self.kern_pair(left, right).map(f32::from)
    }

    fn glyph_count(&self) -> Option<u32> {
        (self.glyph_count > 0).then_some(self.glyph_count)
    }

    fn vertical_advance(&self) -> f32 {
        let span = self.metrics.ascender as i32 - self.metrics.descender as i32;
        if span > 0 {
            span as f32
        } else {
            self.units_per_em as f32
        }
    }
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Face")
            .field("family_name", &self.family_name)
            .field("style_name", &self.style_name)
            .field("face_index", &self.face_index)
            .field("face_count", &self.face_count)
            .field("units_per_em", &self.units_per_em)
            .field("glyph_count", &self.glyph_count)
            .finish()
    }
}
