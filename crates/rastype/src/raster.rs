//! Glyph rasterization: outlines in, coverage masks out
//!
//! Every glyph follows the same road. Skrifa extracts the outline in font
//! units, a pen scales and flips it into mask coordinates (shearing when a
//! face needs synthetic italics), and zeno fills or strokes the path into
//! an 8-bit coverage mask. Post passes then layer on what fonts do not
//! provide themselves: overstrike emboldening, mono thresholding, signed
//! distance fields, and row filtering for subpixel output.
//!
//! Masks are y-down with the glyph's ink box at the origin. `left` and
//! `top` place that box relative to the pen position on the baseline.

use kurbo::Shape;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use zeno::{Cap, Command, Join, Mask, Stroke, Style as StrokeStyle, Vector};

use rastype_core::error::RenderError;
use rastype_core::{FaceRef, GlyphId, GlyphMetrics, Hinting};
use rastype_face::Face;

use crate::sdf;

/// Per-axis ceiling on a single glyph mask
const MAX_MASK_DIM: u32 = 4096;

/// Horizontal lean of synthetic italics, the classic ~12 degree slant
const ITALIC_SHEAR: f32 = 0.207;

/// FreeType's default FIR5 kernel for subpixel filtering, summing to 256
const LCD_FIR: [u32; 5] = [8, 77, 86, 77, 8];

/// Everything that changes what a glyph's pixels look like
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RasterParams {
    pub px_x: f32,
    pub px_y: f32,
    /// Synthesize bold by overstriking
    pub embolden: bool,
    /// Synthesize italics by shearing
    pub italicize: bool,
    /// Stroke ring radius in pixels, 0 for a plain fill
    pub outline: u32,
    pub hinting: Hinting,
    /// Horizontal subpixel phase in [0, 1), nonzero only when the pen
    /// keeps fractional positions
    pub phase: f32,
    /// Produce three coverage channels per pixel
    pub lcd: bool,
    /// Produce a signed distance field instead of plain coverage
    pub sdf: bool,
}

impl RasterParams {
    /// Overstrike distance for synthetic bold: a tenth of the pixel size,
    /// but never less than one pixel
    pub fn overhang(&self) -> u32 {
        if self.embolden {
            ((self.px_y / 10.0).round() as u32).max(1)
        } else {
            0
        }
    }
}

/// A rasterized glyph ready for compositing
///
/// `metrics` is the styled ink box in y-up pixels. The mask itself can be
/// larger than that box: distance fields carry their spread margin and
/// subpixel masks carry filter padding, which `left`/`top` account for.
#[derive(Debug, Clone)]
pub(crate) struct RasterGlyph {
    pub metrics: GlyphMetrics,
    /// Row-major coverage, 3 bytes per pixel when `lcd`, 1 otherwise
    pub mask: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Pen position to left mask edge, pixels
    pub left: i32,
    /// Baseline up to top mask edge, pixels
    pub top: i32,
    pub lcd: bool,
}

impl RasterGlyph {
    /// Glyphs with no ink at all, like spaces
    pub fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rasterizes one glyph of `face` according to `params`.
pub(crate) fn rasterize(
    face: &Face,
    glyph_id: GlyphId,
    params: &RasterParams,
) -> Result<RasterGlyph, RenderError> {
    if params.lcd {
        rasterize_lcd(face, glyph_id, params)
    } else {
        rasterize_gray(face, glyph_id, params)
    }
}

fn rasterize_gray(
    face: &Face,
    glyph_id: GlyphId,
    params: &RasterParams,
) -> Result<RasterGlyph, RenderError> {
    let upem = f32::from(face.units_per_em().max(1));
    let sx = params.px_x / upem;
    let sy = params.px_y / upem;
    let shear = if params.italicize { ITALIC_SHEAR } else { 0.0 };
    let advance = scaled_advance(face, glyph_id, params);

    let Some(outline) = extract_outline(face, glyph_id, sx, sy, shear)? else {
        return Ok(blank_glyph(advance, false));
    };

    let ring = params.outline as f32;
    let overhang = params.overhang() as i32;
    let min_x = (outline.x0 - ring).floor() as i32;
    let max_x = (outline.x1 + ring).ceil() as i32 + overhang;
    let top = -((outline.y0 - ring).floor() as i32);
    let bottom = -((outline.y1 + ring).ceil() as i32);
    let metrics = GlyphMetrics {
        min_x,
        max_x,
        min_y: bottom,
        max_y: top,
        advance,
    };

    let box_w = max_x - min_x;
    let box_h = top - bottom;
    if box_w <= 0 || box_h <= 0 {
        return Ok(blank_glyph(advance, false));
    }

    // A fractional phase shifts ink rightward by under a pixel, so the
    // mask needs one spare column to catch it
    let frac = params.phase;
    let width = box_w as u32 + u32::from(frac > 0.0);
    let height = box_h as u32;
    check_mask_budget(width, height)?;

    let mut mask = vec![0u8; width as usize * height as usize];
    let mut raster = Mask::new(outline.commands.as_slice());
    raster
        .size(width, height)
        .offset(Vector::new(-min_x as f32 + frac, top as f32));
    if params.outline > 0 {
        raster.style(StrokeStyle::Stroke(stroke_ring(params.outline)));
    }
    raster.render_into(&mut mask, None);

    if overhang > 0 {
        overstrike(&mut mask, width as usize, overhang as usize);
    }
    if params.hinting == Hinting::Mono {
        binarize(&mut mask);
    }

    if params.sdf {
        let spread = sdf::SPREAD;
        let (mask, width, height) = sdf::distance_field(&mask, width, height, spread);
        check_mask_budget(width, height)?;
        return Ok(RasterGlyph {
            metrics,
            mask,
            width,
            height,
            left: min_x - spread as i32,
            top: top + spread as i32,
            lcd: false,
        });
    }

    Ok(RasterGlyph {
        metrics,
        mask,
        width,
        height,
        left: min_x,
        top,
        lcd: false,
    })
}

fn rasterize_lcd(
    face: &Face,
    glyph_id: GlyphId,
    params: &RasterParams,
) -> Result<RasterGlyph, RenderError> {
    if params.outline > 0 {
        // Supersampling only the x axis would thin the stroke ring, so
        // stroked glyphs render at pixel resolution and get spread across
        // subpixels afterwards
        let gray = rasterize_gray(
            face,
            glyph_id,
            &RasterParams {
                lcd: false,
                sdf: false,
                ..*params
            },
        )?;
        return Ok(widen_to_lcd(gray));
    }

    let upem = f32::from(face.units_per_em().max(1));
    let sx = params.px_x / upem * 3.0;
    let sy = params.px_y / upem;
    let shear = if params.italicize { ITALIC_SHEAR * 3.0 } else { 0.0 };
    let advance = scaled_advance(face, glyph_id, params);

    let Some(outline) = extract_outline(face, glyph_id, sx, sy, shear)? else {
        return Ok(blank_glyph(advance, true));
    };

    let overhang = params.overhang() as i32;
    // Pixel-space ink box; x stays aligned so subpixel triplets land on
    // the whole-pixel grid
    let min_x = (outline.x0 / 3.0).floor() as i32;
    let max_x = (outline.x1 / 3.0).ceil() as i32 + overhang;
    let top = -(outline.y0.floor() as i32);
    let bottom = -(outline.y1.ceil() as i32);
    let metrics = GlyphMetrics {
        min_x,
        max_x,
        min_y: bottom,
        max_y: top,
        advance,
    };

    let box_w = max_x - min_x;
    let box_h = top - bottom;
    if box_w <= 0 || box_h <= 0 {
        return Ok(blank_glyph(advance, true));
    }

    let frac = params.phase;
    let sub_w = (box_w as u32 + u32::from(frac > 0.0)) * 3;
    let height = box_h as u32;
    check_mask_budget(sub_w / 3 + 2, height)?;

    let mut sub = vec![0u8; sub_w as usize * height as usize];
    Mask::new(outline.commands.as_slice())
        .size(sub_w, height)
        .offset(Vector::new((-min_x * 3) as f32 + frac * 3.0, top as f32))
        .render_into(&mut sub, None);

    if overhang > 0 {
        overstrike(&mut sub, sub_w as usize, overhang as usize * 3);
    }
    if params.hinting == Hinting::Mono {
        binarize(&mut sub);
    }

    let (mask, width) = lcd_filter(&sub, sub_w as usize, height as usize);
    Ok(RasterGlyph {
        metrics,
        mask,
        width,
        height,
        left: min_x - 1,
        top,
        lcd: true,
    })
}

/// Glyph advance in whole pixels, overstrike included
fn scaled_advance(face: &Face, glyph_id: GlyphId, params: &RasterParams) -> i32 {
    let upem = f32::from(face.units_per_em().max(1));
    let px = face.advance_width(glyph_id) * params.px_x / upem;
    px.round() as i32 + params.overhang() as i32
}

fn blank_glyph(advance: i32, lcd: bool) -> RasterGlyph {
    RasterGlyph {
        metrics: GlyphMetrics {
            advance,
            ..GlyphMetrics::default()
        },
        mask: Vec::new(),
        width: 0,
        height: 0,
        left: 0,
        top: 0,
        lcd,
    }
}

fn check_mask_budget(width: u32, height: u32) -> Result<(), RenderError> {
    if width > MAX_MASK_DIM || height > MAX_MASK_DIM {
        return Err(RenderError::SizeOverflow { width, height });
    }
    Ok(())
}

/// The hollow ring around a glyph: zeno strokes centered on the contour,
/// so the pen diameter is twice the requested ring radius
fn stroke_ring(radius: u32) -> Stroke<'static> {
    let mut stroke = Stroke::new((radius * 2) as f32);
    stroke.join = Join::Round;
    stroke.start_cap = Cap::Round;
    stroke.end_cap = Cap::Round;
    stroke
}

/// Synthetic bold: each pixel takes the maximum of itself and its
/// `overhang` left neighbors, smearing coverage rightward
fn overstrike(mask: &mut [u8], width: usize, overhang: usize) {
    for row in mask.chunks_exact_mut(width) {
        for x in (0..width).rev() {
            let lo = x.saturating_sub(overhang);
            let mut cov = row[x];
            for s in lo..x {
                cov = cov.max(row[s]);
            }
            row[x] = cov;
        }
    }
}

/// Hard threshold at half coverage for mono hinting
fn binarize(mask: &mut [u8]) {
    for cov in mask.iter_mut() {
        *cov = if *cov >= 128 { 255 } else { 0 };
    }
}

/// Low-passes each row of subpixel coverage with [`LCD_FIR`], one output
/// channel per subpixel
///
/// The output gains one padding pixel per side because the kernel reaches
/// two subpixels past the glyph edge. Returns the mask and its pixel width.
fn lcd_filter(sub: &[u8], sub_w: usize, height: usize) -> (Vec<u8>, u32) {
    let px_w = sub_w / 3 + 2;
    let mut out = vec![0u8; px_w * 3 * height];
    for y in 0..height {
        let srow = &sub[y * sub_w..y * sub_w + sub_w];
        let orow = &mut out[y * px_w * 3..(y + 1) * px_w * 3];
        for (i, slot) in orow.iter_mut().enumerate() {
            // Output subpixel i sits over source subpixel i - 3 because of
            // the left padding pixel
            let center = i as i64 - 3;
            let mut acc = 0u32;
            for (k, weight) in LCD_FIR.iter().enumerate() {
                let s = center + k as i64 - 2;
                if (0..sub_w as i64).contains(&s) {
                    acc += u32::from(srow[s as usize]) * weight;
                }
            }
            *slot = ((acc + 128) >> 8).min(255) as u8;
        }
    }
    (out, px_w as u32)
}

/// Promotes a grayscale mask to subpixel triplets by replication, then
/// runs the same row filter as the true subpixel path
fn widen_to_lcd(gray: RasterGlyph) -> RasterGlyph {
    if gray.is_blank() {
        return RasterGlyph { lcd: true, ..gray };
    }
    let gw = gray.width as usize;
    let sub_w = gw * 3;
    let mut sub = vec![0u8; sub_w * gray.height as usize];
    for (srow, grow) in sub
        .chunks_exact_mut(sub_w)
        .zip(gray.mask.chunks_exact(gw))
    {
        for (triple, &cov) in srow.chunks_exact_mut(3).zip(grow.iter()) {
            triple.fill(cov);
        }
    }
    let (mask, width) = lcd_filter(&sub, sub_w, gray.height as usize);
    RasterGlyph {
        metrics: gray.metrics,
        mask,
        width,
        height: gray.height,
        left: gray.left - 1,
        top: gray.top,
        lcd: true,
    }
}

struct Outline {
    commands: Vec<Command>,
    /// Ink bounds in mask coordinates, y-down
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

/// Pulls a glyph outline through the pen. `None` means the glyph has no
/// ink: empty slots, spaces, and bitmap-only faces all land there.
fn extract_outline(
    face: &Face,
    glyph_id: GlyphId,
    sx: f32,
    sy: f32,
    shear: f32,
) -> Result<Option<Outline>, RenderError> {
    let font_ref = skrifa::FontRef::from_index(face.data(), face.face_index()).map_err(|err| {
        RenderError::Outline {
            glyph_id,
            reason: err.to_string(),
        }
    })?;
    let outlines = font_ref.outline_glyphs();
    let Some(glyph) = outlines.get(skrifa::GlyphId::new(glyph_id)) else {
        return Ok(None);
    };

    let mut pen = MaskPen::new(sx, sy, shear);
    let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
    glyph.draw(settings, &mut pen).map_err(|err| RenderError::Outline {
        glyph_id,
        reason: err.to_string(),
    })?;

    let (commands, path) = pen.finish();
    if commands.is_empty() {
        return Ok(None);
    }
    let bbox = path.bounding_box();
    if !bbox.x0.is_finite() || !bbox.y0.is_finite() || !bbox.x1.is_finite() || !bbox.y1.is_finite()
    {
        return Ok(None);
    }
    Ok(Some(Outline {
        commands,
        x0: bbox.x0 as f32,
        y0: bbox.y0 as f32,
        x1: bbox.x1 as f32,
        y1: bbox.y1 as f32,
    }))
}

/// Dual-output pen: zeno commands for rasterization and a kurbo path for
/// exact bounds, built in one pass over the outline
struct MaskPen {
    commands: Vec<Command>,
    path: kurbo::BezPath,
    sx: f32,
    sy: f32,
    shear: f32,
}

impl MaskPen {
    fn new(sx: f32, sy: f32, shear: f32) -> Self {
        Self {
            commands: Vec::new(),
            path: kurbo::BezPath::new(),
            sx,
            sy,
            shear,
        }
    }

    /// Font units (y-up) to mask coordinates (y-down). The shear applies
    /// after the flip so italics lean right.
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        let my = -y * self.sy;
        let mx = x * self.sx - self.shear * my;
        (mx, my)
    }

    fn finish(self) -> (Vec<Command>, kurbo::BezPath) {
        (self.commands, self.path)
    }
}

impl OutlinePen for MaskPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.commands.push(Command::MoveTo([x, y].into()));
        self.path.move_to((f64::from(x), f64::from(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.commands.push(Command::LineTo([x, y].into()));
        self.path.line_to((f64::from(x), f64::from(y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.map(cx0, cy0);
        let (x, y) = self.map(x, y);
        self.commands
            .push(Command::QuadTo([cx0, cy0].into(), [x, y].into()));
        self.path.quad_to(
            (f64::from(cx0), f64::from(cy0)),
            (f64::from(x), f64::from(y)),
        );
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (cx0, cy0) = self.map(cx0, cy0);
        let (cx1, cy1) = self.map(cx1, cy1);
        let (x, y) = self.map(x, y);
        self.commands.push(Command::CurveTo(
            [cx0, cy0].into(),
            [cx1, cy1].into(),
            [x, y].into(),
        ));
        self.path.curve_to(
            (f64::from(cx0), f64::from(cy0)),
            (f64::from(cx1), f64::from(cy1)),
            (f64::from(x), f64::from(y)),
        );
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overstrike_smears_coverage_rightward() {
        let mut mask = vec![0, 200, 0, 0];
        overstrike(&mut mask, 4, 1);
        assert_eq!(mask, vec![0, 200, 200, 0]);
    }

    #[test]
    fn overstrike_keeps_the_maximum() {
        let mut mask = vec![100, 50, 200, 10];
        overstrike(&mut mask, 4, 2);
        assert_eq!(mask, vec![100, 100, 200, 200]);
    }

    #[test]
    fn binarize_thresholds_at_half_coverage() {
        let mut mask = vec![0, 127, 128, 255];
        binarize(&mut mask);
        assert_eq!(mask, vec![0, 0, 255, 255]);
    }

    #[test]
    fn lcd_filter_conserves_flat_coverage() {
        // The kernel weights sum to 256, so fully covered interior
        // subpixels stay fully covered
        let sub = vec![255u8; 9];
        let (out, px_w) = lcd_filter(&sub, 9, 1);
        assert_eq!(px_w, 5);
        assert_eq!(out.len(), 15);
        assert_eq!(&out[6..9], &[255, 255, 255]);
        // The padding pixel catches only kernel rolloff
        assert!(out[0] < 255);
    }

    #[test]
    fn mask_budget_rejects_oversized_glyphs() {
        assert!(check_mask_budget(4096, 4096).is_ok());
        assert!(matches!(
            check_mask_budget(4097, 10),
            Err(RenderError::SizeOverflow {
                width: 4097,
                height: 10
            })
        ));
    }

    #[test]
    fn pen_flips_y_and_shears_after_the_flip() {
        let pen = MaskPen::new(1.0, 1.0, 0.5);
        let (x, y) = pen.map(10.0, 4.0);
        assert_eq!(y, -4.0);
        assert_eq!(x, 12.0);
    }

    #[test]
    fn overhang_tracks_pixel_size_with_a_floor_of_one() {
        let mut params = RasterParams {
            px_x: 16.0,
            px_y: 16.0,
            embolden: true,
            italicize: false,
            outline: 0,
            hinting: Hinting::Normal,
            phase: 0.0,
            lcd: false,
            sdf: false,
        };
        assert_eq!(params.overhang(), 2);
        params.px_y = 5.0;
        assert_eq!(params.overhang(), 1);
        params.embolden = false;
        assert_eq!(params.overhang(), 0);
    }
}
