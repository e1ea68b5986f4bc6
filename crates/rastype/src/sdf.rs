//! Signed distance fields from coverage masks
//!
//! A brute-force transform good enough for glyph-sized rasters: every
//! output pixel searches a square window for the nearest edge crossing and
//! encodes its distance around a midpoint of 127. Values above the
//! midpoint are inside the glyph, values below are outside, and the
//! gradient spans [`SPREAD`] pixels each way, which is what lets a sampler
//! scale or soften the glyph after the fact.

/// Distance field reach in pixels on each side of the edge
pub(crate) const SPREAD: u32 = 8;

/// Coverage at or above this counts as inside the glyph
const INSIDE_THRESHOLD: u8 = 128;

/// Expands `mask` by `spread` pixels on every side and fills the result
/// with encoded distances. Returns the field with its new dimensions.
pub(crate) fn distance_field(
    mask: &[u8],
    width: u32,
    height: u32,
    spread: u32,
) -> (Vec<u8>, u32, u32) {
    if width == 0 || height == 0 {
        return (Vec::new(), 0, 0);
    }

    let out_w = width + spread * 2;
    let out_h = height + spread * 2;
    let mut out = vec![0u8; out_w as usize * out_h as usize];

    let w = width as i32;
    let h = height as i32;
    let covered = |x: i32, y: i32| -> bool {
        x >= 0
            && y >= 0
            && x < w
            && y < h
            && mask[y as usize * width as usize + x as usize] >= INSIDE_THRESHOLD
    };

    let reach = spread as i32;
    for oy in 0..out_h as i32 {
        for ox in 0..out_w as i32 {
            let x = ox - reach;
            let y = oy - reach;
            let inside = covered(x, y);

            // Nearest pixel on the other side of the edge within reach
            let mut min_dist = spread as f32;
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    if covered(x + dx, y + dy) != inside {
                        let dist = ((dx * dx + dy * dy) as f32).sqrt();
                        if dist < min_dist {
                            min_dist = dist;
                        }
                    }
                }
            }

            let normalized = (min_dist / spread as f32).clamp(0.0, 1.0);
            let value = if inside {
                127.0 + normalized * 128.0
            } else {
                127.0 - normalized * 127.0
            };
            out[oy as usize * out_w as usize + ox as usize] = value.clamp(0.0, 255.0) as u8;
        }
    }

    (out, out_w, out_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_stays_empty() {
        let (field, w, h) = distance_field(&[], 0, 0, SPREAD);
        assert!(field.is_empty());
        assert_eq!((w, h), (0, 0));
    }

    #[test]
    fn field_grows_by_the_spread_margin() {
        let mask = vec![255u8; 4 * 3];
        let (field, w, h) = distance_field(&mask, 4, 3, SPREAD);
        assert_eq!(w, 4 + SPREAD * 2);
        assert_eq!(h, 3 + SPREAD * 2);
        assert_eq!(field.len(), (w * h) as usize);
    }

    #[test]
    fn inside_reads_above_the_midpoint_and_outside_below() {
        // A 3x3 solid block: its center is inside, the far corner of the
        // margin is well outside
        let mask = vec![255u8; 9];
        let (field, w, _) = distance_field(&mask, 3, 3, 4);
        let at = |x: u32, y: u32| field[(y * w + x) as usize];

        let center = at(4 + 1, 4 + 1);
        assert!(center > 127, "center should be inside, got {center}");
        assert_eq!(at(0, 0), 0, "corner is beyond the spread");
    }

    #[test]
    fn distance_decays_away_from_the_edge() {
        // One covered pixel; walking right from it the encoded value
        // must strictly drop until the spread clamps it
        let mask = vec![255u8];
        let spread = 4;
        let (field, w, _) = distance_field(&mask, 1, 1, spread);
        let row = spread as u32;
        let at = |x: u32| field[(row * w + x) as usize];

        let on_glyph = at(spread as u32);
        assert!(on_glyph > 127);
        let mut previous = on_glyph;
        for step in 1..=spread {
            let v = at(spread as u32 + step);
            assert!(v < previous, "step {step}: {v} !< {previous}");
            previous = v;
        }
    }

    #[test]
    fn uncovered_mask_renders_all_outside() {
        let mask = vec![0u8; 16];
        let (field, _, _) = distance_field(&mask, 4, 4, 3);
        assert!(field.iter().all(|&v| v <= 127));
    }
}
