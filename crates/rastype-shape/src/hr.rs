//! OpenType shaping through harfrust
//!
//! Harfrust is a pure Rust port of HarfBuzz, so the full shaping model
//! comes along: ligatures, contextual substitution, mark positioning, and
//! script-specific reordering, all without a C dependency. When the face
//! bytes cannot be parsed the shaper degrades to simple advancement
//! rather than failing the whole render.

use harfrust::{
    Direction as HrDirection, Feature, FontRef as HrFontRef, GlyphBuffer, Script, ShaperData,
    Tag, UnicodeBuffer,
};

use rastype_core::error::ShapeError;
use rastype_core::{Direction, FaceRef, ShapeOptions, ShapedGlyph, ShapedRun, Shaper};

use crate::simple::SimpleShaper;

/// Full OpenType shaping powered by harfrust
pub struct HarfrustShaper;

impl HarfrustShaper {
    /// Creates a new harfrust shaper ready to handle any script
    pub fn new() -> Self {
        Self
    }

    /// Translates our direction enum to harfrust's format
    fn to_hr_direction(direction: Direction) -> HrDirection {
        match direction {
            Direction::LeftToRight => HrDirection::LeftToRight,
            Direction::RightToLeft => HrDirection::RightToLeft,
            Direction::TopToBottom => HrDirection::TopToBottom,
            Direction::BottomToTop => HrDirection::BottomToTop,
        }
    }

    /// Extract positioned glyphs from harfrust's GlyphBuffer, scaled to
    /// pixels
    fn extract_glyphs(buffer: &GlyphBuffer, options: &ShapeOptions, upem: u16) -> ShapedRun {
        let upem = upem.max(1) as f32;
        let sx = options.px_per_em_x / upem;
        let sy = options.px_per_em_y / upem;

        let positions = buffer.glyph_positions();
        let infos = buffer.glyph_infos();

        let mut glyphs = Vec::with_capacity(infos.len());
        let mut advance_width = 0.0f32;
        let mut advance_height = 0.0f32;

        for (info, pos) in infos.iter().zip(positions.iter()) {
            let x_advance = pos.x_advance as f32 * sx;
            // HarfBuzz positions are y-up, so downward flow is negative
            let y_advance = pos.y_advance as f32 * sy;

            glyphs.push(ShapedGlyph {
                id: info.glyph_id,
                cluster: info.cluster,
                x_advance,
                y_advance,
                x_offset: pos.x_offset as f32 * sx,
                y_offset: pos.y_offset as f32 * sy,
            });

            advance_width += x_advance;
            advance_height -= y_advance;
        }

        if options.direction.is_vertical() {
            // Vertical origins center each glyph on the column axis, so
            // twice the largest shift is the column width
            advance_width = glyphs
                .iter()
                .map(|glyph| 2.0 * glyph.x_offset.abs())
                .fold(0.0, f32::max);
        }

        ShapedRun {
            glyphs,
            direction: options.direction,
            advance_width,
            advance_height,
        }
    }
}

impl Default for HarfrustShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for HarfrustShaper {
    fn name(&self) -> &'static str {
        "harfrust"
    }

    fn shape(
        &self,
        text: &str,
        face: &dyn FaceRef,
        options: &ShapeOptions,
    ) -> Result<ShapedRun, ShapeError> {
        if text.is_empty() {
            return Ok(ShapedRun {
                glyphs: Vec::new(),
                direction: options.direction,
                advance_width: 0.0,
                advance_height: 0.0,
            });
        }

        let data = face.data();
        if data.is_empty() {
            log::debug!("harfrust: face has no data, using simple advancement");
            return SimpleShaper::new().shape(text, face, options);
        }

        let hr_font = match HrFontRef::from_index(data, face.face_index()) {
            Ok(font) => font,
            Err(err) => {
                log::warn!("harfrust: could not parse face ({err}), using simple advancement");
                return SimpleShaper::new().shape(text, face, options);
            }
        };

        // ShaperData caches font tables and is the expensive part
        let shaper_data = ShaperData::new(&hr_font);
        let shaper = shaper_data
            .shaper(&hr_font)
            .point_size(Some(options.px_per_em_y))
            .build();

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(Self::to_hr_direction(options.direction));

        if let Some(tag) = options.script {
            if let Some(script) = Script::from_iso15924_tag(Tag::new(&tag)) {
                buffer.set_script(script);
            }
        }

        // Kerning defaults on inside harfrust; an explicit zero-value
        // feature is how it gets switched off
        let mut features: Vec<Feature> = Vec::new();
        if !options.kerning {
            features.push(Feature {
                tag: Tag::new(b"kern"),
                value: 0,
                start: 0,
                end: u32::MAX,
            });
        }

        let output = shaper.shape(buffer, &features);

        Ok(Self::extract_glyphs(&output, options, face.units_per_em()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::GlyphId;

    struct EmptyFace;

    impl FaceRef for EmptyFace {
        fn data(&self) -> &[u8] {
            &[]
        }

        fn face_index(&self) -> u32 {
            0
        }

        fn units_per_em(&self) -> u16 {
            1000
        }

        fn glyph_index(&self, ch: char) -> Option<GlyphId> {
            ch.is_ascii().then_some(ch as u32)
        }

        fn advance_width(&self, _glyph: GlyphId) -> f32 {
            500.0
        }
    }

    #[test]
    fn empty_text_shapes_to_nothing() {
        let run = HarfrustShaper::new()
            .shape("", &EmptyFace, &ShapeOptions::default())
            .unwrap();
        assert!(run.is_empty());
        assert_eq!(run.advance_width, 0.0);
    }

    #[test]
    fn missing_font_data_falls_back_to_simple_advancement() {
        let run = HarfrustShaper::new()
            .shape("Hi", &EmptyFace, &ShapeOptions::default())
            .unwrap();
        assert_eq!(run.glyphs.len(), 2);
        assert!(run.advance_width > 0.0);
    }

    #[test]
    fn unparseable_font_data_falls_back_too() {
        struct GarbageFace;
        impl FaceRef for GarbageFace {
            fn data(&self) -> &[u8] {
                // Not a font in any format harfrust knows
                b"definitely not a font file at all"
            }
            fn face_index(&self) -> u32 {
                0
            }
            fn units_per_em(&self) -> u16 {
                2048
            }
            fn glyph_index(&self, ch: char) -> Option<GlyphId> {
                Some(ch as u32)
            }
            fn advance_width(&self, _glyph: GlyphId) -> f32 {
                1024.0
            }
        }

        let run = HarfrustShaper::new()
            .shape("ok", &GarbageFace, &ShapeOptions::default())
            .unwrap();
        assert_eq!(run.glyphs.len(), 2);
    }

    #[test]
    fn direction_rides_along_on_the_run() {
        let options = ShapeOptions {
            direction: Direction::RightToLeft,
            ..Default::default()
        };
        let run = HarfrustShaper::new()
            .shape("abc", &EmptyFace, &options)
            .unwrap();
        assert_eq!(run.direction, Direction::RightToLeft);
        assert_eq!(run.glyphs.len(), 3);
    }
}
