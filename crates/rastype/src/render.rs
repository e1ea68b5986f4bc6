//! Compositing shaped glyphs onto surfaces
//!
//! The four render tiers differ only in how a coverage byte becomes a
//! pixel. Solid snaps coverage to a two-entry palette with a transparent
//! color key. Shaded writes coverage straight into a 256-entry ramp from
//! background to foreground. Blended keeps the text color and composites
//! coverage into the alpha channel. Lcd starts from an opaque background
//! and mixes toward the foreground per subpixel channel. Everything
//! upstream of that last step (shaping, positioning, line breaking,
//! decorations) is shared.

use std::ops::Range;
use std::sync::Arc;

use rastype_core::error::{RenderError, Result};
use rastype_core::{Color, Hinting, Palette, Style, Surface};

use crate::cache::{GlyphKey, PHASE_BUCKETS};
use crate::font::Font;
use crate::layout;
use crate::raster::RasterGlyph;

/// One of the four pixel tiers together with its colors
#[derive(Debug, Clone, Copy)]
pub(crate) enum RenderMode {
    Solid { fg: Color },
    Shaded { fg: Color, bg: Color },
    Blended { fg: Color },
    Lcd { fg: Color, bg: Color },
}

impl RenderMode {
    fn lcd(&self) -> bool {
        matches!(self, RenderMode::Lcd { .. })
    }

    /// Distance fields only make sense where alpha survives to the output
    fn sdf_capable(&self) -> bool {
        matches!(self, RenderMode::Blended { .. })
    }
}

/// Renders a single line of text, vertical flows included.
pub(crate) fn render_line(font: &Font, text: &str, mode: &RenderMode) -> Result<Surface> {
    if font.direction().is_vertical() {
        return render_line_vertical(font, text, mode);
    }

    let line = lay_out_line(font, text, mode)?;
    let height = font.height();
    if line.width <= 0 || height <= 0 {
        return Err(RenderError::ZeroWidth.into());
    }

    let mut surface = new_surface(mode, line.width as u32, height as u32)?;
    for glyph in &line.placed {
        blit(&mut surface, &glyph.raster, glyph.x, glyph.y, mode);
    }
    draw_decorations(&mut surface, font, 0, 0, line.width, mode);
    Ok(surface)
}

/// Renders text wrapped to `wrap_width` pixels (0 wraps on newlines only).
pub(crate) fn render_wrapped(
    font: &Font,
    text: &str,
    wrap_width: u32,
    mode: &RenderMode,
) -> Result<Surface> {
    if font.direction().is_vertical() {
        return Err(RenderError::UnsupportedDirection.into());
    }

    let mut segments: Vec<Range<usize>> = Vec::new();
    for hard in layout::hard_lines(text) {
        segments.extend(layout::wrap_line(text, hard, wrap_width, |slice| {
            font.measure(slice, wrap_width as i32).map(|m| m.count)
        })?);
    }

    let mut lines = Vec::with_capacity(segments.len());
    let mut max_width = 0i32;
    for segment in &segments {
        let line = lay_out_line(font, &text[segment.clone()], mode)?;
        max_width = max_width.max(line.width);
        lines.push(line);
    }
    if max_width <= 0 {
        return Err(RenderError::ZeroWidth.into());
    }

    let line_skip = font.line_skip();
    let height = line_skip * (lines.len() as i32 - 1) + font.height();
    if height <= 0 {
        return Err(RenderError::ZeroWidth.into());
    }

    let mut surface = new_surface(mode, max_width as u32, height as u32)?;
    for (index, line) in lines.iter().enumerate() {
        let x = layout::align_offset(font.wrap_align(), max_width, line.width);
        let y = index as i32 * line_skip;
        for glyph in &line.placed {
            blit(&mut surface, &glyph.raster, x + glyph.x, y + glyph.y, mode);
        }
        draw_decorations(&mut surface, font, x, y, line.width, mode);
    }
    Ok(surface)
}

/// Renders one character on its own surface.
pub(crate) fn render_glyph(font: &Font, ch: char, mode: &RenderMode) -> Result<Surface> {
    if font.glyph_index(ch).is_none() {
        return Err(RenderError::GlyphNotFound(ch as u32).into());
    }
    let mut buf = [0u8; 4];
    render_line(font, ch.encode_utf8(&mut buf), mode)
}

struct Placed {
    raster: Arc<RasterGlyph>,
    /// Mask top-left relative to the line's top-left
    x: i32,
    y: i32,
}

struct Line {
    placed: Vec<Placed>,
    width: i32,
}

/// Shapes and positions one line, pinning the leftmost ink to x = 0
///
/// The line width covers both the pen travel and any ink that hangs past
/// it (italic overhang, outline rings, negative bearings).
fn lay_out_line(font: &Font, text: &str, mode: &RenderMode) -> Result<Line> {
    let run = font.shape_text(text)?;
    let subpixel = font.hinting() == Hinting::LightSubpixel;

    let mut pen = 0.0f32;
    let mut min_edge = 0.0f32;
    let mut max_edge = 0.0f32;
    let mut pending: Vec<(Arc<RasterGlyph>, f32, f32)> = Vec::with_capacity(run.glyphs.len());

    for shaped in &run.glyphs {
        let gx = pen + shaped.x_offset;
        let gy = shaped.y_offset;
        let phase = if subpixel { phase_bucket(gx) } else { 0 };
        let raster = font.raster_glyph(GlyphKey {
            glyph_id: shaped.id,
            phase,
            lcd: mode.lcd(),
            sdf: mode.sdf_capable() && font.sdf(),
        })?;
        if !raster.is_blank() {
            min_edge = min_edge.min(gx + raster.metrics.min_x as f32);
            max_edge = max_edge.max(gx + raster.metrics.max_x as f32);
        }
        pending.push((raster, gx, gy));
        pen += shaped.x_advance;
    }
    max_edge = max_edge.max(pen);

    let width = (max_edge.ceil() - min_edge.floor()) as i32;
    let shift = -(min_edge.floor() as i32);
    let baseline = font.ascent();
    let placed = pending
        .into_iter()
        .map(|(raster, gx, gy)| Placed {
            x: shift + gx.floor() as i32 + raster.left,
            y: baseline - gy.round() as i32 - raster.top,
            raster,
        })
        .collect();
    Ok(Line { placed, width })
}

/// Vertical single line: glyphs centered on a column one line-height wide,
/// the pen descending by each glyph's vertical advance
fn render_line_vertical(font: &Font, text: &str, mode: &RenderMode) -> Result<Surface> {
    let run = font.shape_text(text)?;
    let width = font.height();
    let height = run.advance_height.ceil() as i32;
    if width <= 0 || height <= 0 {
        return Err(RenderError::ZeroWidth.into());
    }

    let mut surface = new_surface(mode, width as u32, height as u32)?;
    let center = width as f32 / 2.0;
    let ascent = font.ascent();
    let mut pen_y = 0.0f32;
    for shaped in &run.glyphs {
        let raster = font.raster_glyph(GlyphKey {
            glyph_id: shaped.id,
            phase: 0,
            lcd: mode.lcd(),
            sdf: mode.sdf_capable() && font.sdf(),
        })?;
        let x = (center + shaped.x_offset).floor() as i32 + raster.left;
        let y = pen_y as i32 + ascent - raster.top;
        blit(&mut surface, &raster, x, y, mode);
        pen_y -= shaped.y_advance;
    }
    Ok(surface)
}

fn new_surface(mode: &RenderMode, width: u32, height: u32) -> Result<Surface> {
    let surface = match mode {
        RenderMode::Solid { fg } => {
            // Key entry 0 holds the foreground complement so the two
            // palette entries never collide
            let palette = Palette::new(vec![
                Color::rgb(255 - fg.r, 255 - fg.g, 255 - fg.b),
                *fg,
            ]);
            Surface::new_index8(width, height, palette, Some(0))?
        }
        RenderMode::Shaded { fg, bg } => {
            Surface::new_index8(width, height, Palette::ramp(*bg, *fg), None)?
        }
        RenderMode::Blended { .. } => Surface::new_argb8888(width, height)?,
        RenderMode::Lcd { bg, .. } => {
            let mut surface = Surface::new_argb8888(width, height)?;
            surface.fill_argb(Color::rgb(bg.r, bg.g, bg.b));
            surface
        }
    };
    Ok(surface)
}

fn blit(surface: &mut Surface, glyph: &RasterGlyph, x: i32, y: i32, mode: &RenderMode) {
    if glyph.is_blank() {
        return;
    }
    match mode {
        RenderMode::Solid { .. } => blit_solid(surface, glyph, x, y),
        RenderMode::Shaded { .. } => blit_shaded(surface, glyph, x, y),
        RenderMode::Blended { fg } => blit_blended(surface, glyph, x, y, *fg),
        RenderMode::Lcd { fg, .. } => blit_lcd(surface, glyph, x, y, *fg),
    }
}

fn blit_solid(surface: &mut Surface, glyph: &RasterGlyph, x: i32, y: i32) {
    for (row_index, row) in glyph.mask.chunks_exact(glyph.width as usize).enumerate() {
        let sy = y + row_index as i32;
        if sy < 0 || sy >= surface.height() as i32 {
            continue;
        }
        for (col, &cov) in row.iter().enumerate() {
            if cov < 128 {
                continue;
            }
            let sx = x + col as i32;
            if sx < 0 || sx >= surface.width() as i32 {
                continue;
            }
            surface.put_index(sx as u32, sy as u32, 1);
        }
    }
}

fn blit_shaded(surface: &mut Surface, glyph: &RasterGlyph, x: i32, y: i32) {
    for (row_index, row) in glyph.mask.chunks_exact(glyph.width as usize).enumerate() {
        let sy = y + row_index as i32;
        if sy < 0 || sy >= surface.height() as i32 {
            continue;
        }
        for (col, &cov) in row.iter().enumerate() {
            let sx = x + col as i32;
            if sx < 0 || sx >= surface.width() as i32 {
                continue;
            }
            // Max blend so overlapping glyph edges reinforce instead of
            // punching holes in each other
            if cov > surface.index_at(sx as u32, sy as u32) {
                surface.put_index(sx as u32, sy as u32, cov);
            }
        }
    }
}

fn blit_blended(surface: &mut Surface, glyph: &RasterGlyph, x: i32, y: i32, fg: Color) {
    for (row_index, row) in glyph.mask.chunks_exact(glyph.width as usize).enumerate() {
        let sy = y + row_index as i32;
        if sy < 0 || sy >= surface.height() as i32 {
            continue;
        }
        for (col, &cov) in row.iter().enumerate() {
            let sa = u32::from(cov) * u32::from(fg.a) / 255;
            if sa == 0 {
                continue;
            }
            let sx = x + col as i32;
            if sx < 0 || sx >= surface.width() as i32 {
                continue;
            }
            let dst = surface.argb_at(sx as u32, sy as u32);
            let out_a = sa + u32::from(dst.a) * (255 - sa) / 255;
            surface.put_argb(
                sx as u32,
                sy as u32,
                Color::rgba(fg.r, fg.g, fg.b, out_a as u8),
            );
        }
    }
}

fn blit_lcd(surface: &mut Surface, glyph: &RasterGlyph, x: i32, y: i32, fg: Color) {
    let row_len = glyph.width as usize * 3;
    for (row_index, row) in glyph.mask.chunks_exact(row_len).enumerate() {
        let sy = y + row_index as i32;
        if sy < 0 || sy >= surface.height() as i32 {
            continue;
        }
        for (col, triple) in row.chunks_exact(3).enumerate() {
            if triple[0] == 0 && triple[1] == 0 && triple[2] == 0 {
                continue;
            }
            let sx = x + col as i32;
            if sx < 0 || sx >= surface.width() as i32 {
                continue;
            }
            let dst = surface.argb_at(sx as u32, sy as u32);
            surface.put_argb(
                sx as u32,
                sy as u32,
                Color::rgb(
                    mix(dst.r, fg.r, triple[0]),
                    mix(dst.g, fg.g, triple[1]),
                    mix(dst.b, fg.b, triple[2]),
                ),
            );
        }
    }
}

/// Linear mix from `from` to `to` by `cov`/255
fn mix(from: u8, to: u8, cov: u8) -> u8 {
    (i32::from(from) + (i32::from(to) - i32::from(from)) * i32::from(cov) / 255) as u8
}

/// Underline and strikethrough bands across one line's width
fn draw_decorations(
    surface: &mut Surface,
    font: &Font,
    x: i32,
    y: i32,
    line_width: i32,
    mode: &RenderMode,
) {
    let style = font.style();
    if style.contains(Style::UNDERLINE) {
        let (top, thickness) = font.underline_band();
        fill_band(surface, x, line_width, y + top, thickness, mode);
    }
    if style.contains(Style::STRIKETHROUGH) {
        let (top, thickness) = font.strike_band();
        fill_band(surface, x, line_width, y + top, thickness, mode);
    }
}

fn fill_band(
    surface: &mut Surface,
    x: i32,
    width: i32,
    top: i32,
    thickness: i32,
    mode: &RenderMode,
) {
    // Push the band fully inside the surface rather than clipping it away
    let mut top = top.min(surface.height() as i32 - thickness);
    if top < 0 {
        top = 0;
    }
    let x1 = (x + width).min(surface.width() as i32);
    for y in top..(top + thickness).min(surface.height() as i32) {
        for x in x.max(0)..x1 {
            match mode {
                RenderMode::Solid { .. } => surface.put_index(x as u32, y as u32, 1),
                RenderMode::Shaded { .. } => surface.put_index(x as u32, y as u32, 255),
                RenderMode::Blended { fg } => {
                    let dst = surface.argb_at(x as u32, y as u32);
                    let sa = u32::from(fg.a);
                    let out_a = sa + u32::from(dst.a) * (255 - sa) / 255;
                    surface.put_argb(x as u32, y as u32, Color::rgba(fg.r, fg.g, fg.b, out_a as u8));
                }
                RenderMode::Lcd { fg, .. } => {
                    surface.put_argb(x as u32, y as u32, Color::rgb(fg.r, fg.g, fg.b));
                }
            }
        }
    }
}

/// Quantizes a pen position's fractional part to a phase bucket
fn phase_bucket(x: f32) -> u8 {
    let frac = x - x.floor();
    ((frac * f32::from(PHASE_BUCKETS)) as u8).min(PHASE_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::PixelLayout;

    #[test]
    fn solid_surfaces_carry_a_keyed_two_entry_palette() {
        let fg = Color::rgb(200, 10, 30);
        let surface = new_surface(&RenderMode::Solid { fg }, 4, 4).unwrap();
        assert_eq!(surface.layout(), PixelLayout::Index8);
        assert_eq!(surface.color_key(), Some(0));
        let palette = surface.palette().unwrap();
        assert_eq!(palette.get(1), Some(fg));
        assert_eq!(palette.get(0), Some(Color::rgb(55, 245, 225)));
    }

    #[test]
    fn lcd_surfaces_prefill_the_background() {
        let mode = RenderMode::Lcd {
            fg: Color::black(),
            bg: Color::rgb(40, 50, 60),
        };
        let surface = new_surface(&mode, 2, 2).unwrap();
        assert_eq!(surface.argb_at(1, 1), Color::rgb(40, 50, 60));
    }

    #[test]
    fn blended_band_composites_source_over() {
        let fg = Color::rgba(10, 20, 30, 200);
        let mut surface = Surface::new_argb8888(4, 4).unwrap();
        fill_band(&mut surface, 0, 4, 1, 2, &RenderMode::Blended { fg });

        assert_eq!(surface.argb_at(0, 0).a, 0, "above the band");
        let inside = surface.argb_at(2, 1);
        assert_eq!((inside.r, inside.g, inside.b), (10, 20, 30));
        assert_eq!(inside.a, 200);

        // A second pass composites over the first: 200 + 55 * 200 / 255
        fill_band(&mut surface, 0, 4, 1, 2, &RenderMode::Blended { fg });
        assert_eq!(surface.argb_at(2, 1).a, 243);
    }

    #[test]
    fn band_is_pushed_inside_the_surface() {
        let mut surface = Surface::new_argb8888(4, 4).unwrap();
        let mode = RenderMode::Lcd {
            fg: Color::white(),
            bg: Color::black(),
        };
        // Requested rows 5..7 land on the bottom rows instead
        fill_band(&mut surface, 0, 4, 5, 2, &mode);
        assert_eq!(surface.argb_at(0, 3), Color::white());
        assert_eq!(surface.argb_at(0, 2), Color::white());
        assert_eq!(surface.argb_at(0, 1).a, 0);
    }

    #[test]
    fn mix_is_exact_at_the_endpoints() {
        assert_eq!(mix(10, 250, 0), 10);
        assert_eq!(mix(10, 250, 255), 250);
        assert!(mix(0, 255, 128) > 120 && mix(0, 255, 128) < 136);
    }

    #[test]
    fn phase_buckets_quantize_quarters() {
        assert_eq!(phase_bucket(5.0), 0);
        assert_eq!(phase_bucket(5.24), 0);
        assert_eq!(phase_bucket(5.25), 1);
        assert_eq!(phase_bucket(5.5), 2);
        assert_eq!(phase_bucket(5.99), 3);
        assert_eq!(phase_bucket(-0.25), 3);
    }
}
