//! Simple shaper: per-character advancement with pair kerning
//!
//! No ligatures, no contextual forms, no mark attachment. Each character
//! maps to one glyph, advances by its metric width, and optionally pulls
//! in the font's pair kerning. Right-to-left and vertical flows are
//! produced by reordering and restacking the same per-character results.

use rastype_core::error::ShapeError;
use rastype_core::{Direction, FaceRef, ShapeOptions, ShapedGlyph, ShapedRun, Shaper};

/// A minimal shaper for scripts without contextual rules
pub struct SimpleShaper;

impl SimpleShaper {
    pub fn new() -> Self {
        Self
    }

    fn shape_horizontal(
        text: &str,
        face: &dyn FaceRef,
        options: &ShapeOptions,
    ) -> ShapedRun {
        let upem = face.units_per_em().max(1) as f32;
        let sx = options.px_per_em_x / upem;

        let mut glyphs: Vec<ShapedGlyph> = Vec::new();
        let mut advance_width = 0.0;

        for (cluster, ch) in text.char_indices() {
            // .notdef (0) stands in for unmapped characters
            let id = face.glyph_index(ch).unwrap_or(0);

            // Kerning folds into the previous glyph's advance, the same
            // place HarfBuzz puts it
            if options.kerning {
                if let Some(last) = glyphs.last_mut() {
                    if let Some(adjust) = face.kerning(last.id, id) {
                        let kern = adjust * sx;
                        last.x_advance += kern;
                        advance_width += kern;
                    }
                }
            }

            let x_advance = face.advance_width(id) * sx;
            glyphs.push(ShapedGlyph {
                id,
                cluster: cluster as u32,
                x_advance,
                y_advance: 0.0,
                x_offset: 0.0,
                y_offset: 0.0,
            });
            advance_width += x_advance;
        }

        if options.direction == Direction::RightToLeft {
            // Logical order in, visual order out
            glyphs.reverse();
        }

        ShapedRun {
            glyphs,
            direction: options.direction,
            advance_width,
            advance_height: 0.0,
        }
    }

    fn shape_vertical(text: &str, face: &dyn FaceRef, options: &ShapeOptions) -> ShapedRun {
        let upem = face.units_per_em().max(1) as f32;
        let sx = options.px_per_em_x / upem;
        let sy = options.px_per_em_y / upem;
        let step = face.vertical_advance() * sy;

        let mut glyphs: Vec<ShapedGlyph> = Vec::new();
        let mut advance_width = 0.0f32;
        let mut advance_height = 0.0f32;

        for (cluster, ch) in text.char_indices() {
            let id = face.glyph_index(ch).unwrap_or(0);
            let width = face.advance_width(id) * sx;

            glyphs.push(ShapedGlyph {
                id,
                cluster: cluster as u32,
                x_advance: 0.0,
                // Negative because pixel y grows up and the column grows down
                y_advance: -step,
                // Center the glyph on the column axis
                x_offset: -width / 2.0,
                y_offset: 0.0,
            });
            advance_width = advance_width.max(width);
            advance_height += step;
        }

        if options.direction == Direction::BottomToTop {
            glyphs.reverse();
        }

        ShapedRun {
            glyphs,
            direction: options.direction,
            advance_width,
            advance_height,
        }
    }
}

impl Default for SimpleShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for SimpleShaper {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn shape(
        &self,
        text: &str,
        face: &dyn FaceRef,
        options: &ShapeOptions,
    ) -> Result<ShapedRun, ShapeError> {
        log::debug!("SimpleShaper: shaping {} chars", text.chars().count());

        let run = if options.direction.is_vertical() {
            Self::shape_vertical(text, face, options)
        } else {
            Self::shape_horizontal(text, face, options)
        };
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::GlyphId;

    // Mock face: ASCII maps to its own codepoint, every glyph 500 units
    // wide, 'A' followed by 'V' kerns by -80 units
    struct MockFace;

    impl FaceRef for MockFace {
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

        fn kerning(&self, left: GlyphId, right: GlyphId) -> Option<f32> {
            (left == 'A' as u32 && right == 'V' as u32).then_some(-80.0)
        }
    }

    fn options(px: f32) -> ShapeOptions {
        ShapeOptions {
            px_per_em_x: px,
            px_per_em_y: px,
            ..Default::default()
        }
    }

    #[test]
    fn advances_accumulate_left_to_right() {
        let run = SimpleShaper::new()
            .shape("Hi", &MockFace, &options(16.0))
            .unwrap();

        assert_eq!(run.glyphs.len(), 2);
        // 500/1000 * 16px = 8px per glyph
        assert_eq!(run.glyphs[0].x_advance, 8.0);
        assert_eq!(run.advance_width, 16.0);
        assert_eq!(run.advance_height, 0.0);
    }

    #[test]
    fn kerning_tightens_the_pair() {
        let kerned = SimpleShaper::new()
            .shape("AV", &MockFace, &options(16.0))
            .unwrap();
        let plain = SimpleShaper::new()
            .shape(
                "AV",
                &MockFace,
                &ShapeOptions {
                    kerning: false,
                    ..options(16.0)
                },
            )
            .unwrap();

        // -80/1000 * 16px = -1.28px folded into the first advance
        assert!(kerned.advance_width < plain.advance_width);
        assert_eq!(plain.advance_width, 16.0);
        assert!((kerned.advance_width - 14.72).abs() < 1e-4);
        assert!(kerned.glyphs[0].x_advance < plain.glyphs[0].x_advance);
    }

    #[test]
    fn rtl_reverses_visual_order_but_not_width() {
        let ltr = SimpleShaper::new()
            .shape("abc", &MockFace, &options(16.0))
            .unwrap();
        let rtl = SimpleShaper::new()
            .shape(
                "abc",
                &MockFace,
                &ShapeOptions {
                    direction: Direction::RightToLeft,
                    ..options(16.0)
                },
            )
            .unwrap();

        assert_eq!(rtl.advance_width, ltr.advance_width);
        assert_eq!(rtl.glyphs[0].id, 'c' as u32);
        assert_eq!(rtl.glyphs[2].id, 'a' as u32);
        // Clusters still name the original byte offsets
        assert_eq!(rtl.glyphs[0].cluster, 2);
    }

    #[test]
    fn vertical_stacks_downward() {
        let run = SimpleShaper::new()
            .shape(
                "ab",
                &MockFace,
                &ShapeOptions {
                    direction: Direction::TopToBottom,
                    ..options(16.0)
                },
            )
            .unwrap();

        assert_eq!(run.glyphs.len(), 2);
        assert!(run.glyphs[0].y_advance < 0.0);
        assert_eq!(run.glyphs[0].x_advance, 0.0);
        assert!(run.advance_height > 0.0);
        // Column is as wide as the widest glyph
        assert_eq!(run.advance_width, 8.0);
        // Glyphs center on the column axis
        assert_eq!(run.glyphs[0].x_offset, -4.0);
    }

    #[test]
    fn bottom_to_top_reverses_the_stack() {
        let ttb = SimpleShaper::new()
            .shape(
                "ab",
                &MockFace,
                &ShapeOptions {
                    direction: Direction::TopToBottom,
                    ..options(16.0)
                },
            )
            .unwrap();
        let btt = SimpleShaper::new()
            .shape(
                "ab",
                &MockFace,
                &ShapeOptions {
                    direction: Direction::BottomToTop,
                    ..options(16.0)
                },
            )
            .unwrap();

        assert_eq!(btt.glyphs[0].id, ttb.glyphs[1].id);
        assert_eq!(btt.advance_height, ttb.advance_height);
    }

    #[test]
    fn empty_text_is_an_empty_run() {
        let run = SimpleShaper::new()
            .shape("", &MockFace, &options(16.0))
            .unwrap();
        assert!(run.is_empty());
        assert_eq!(run.advance_width, 0.0);
    }
}
