//! Per-font raster cache
//!
//! Rasterizing a glyph costs orders of magnitude more than looking one
//! up, and running text re-uses a small working set of glyphs over and
//! over. Each [`Font`](crate::Font) keeps its rendered masks behind the
//! shared two-level LRU so repeated renders of the same text mostly hit
//! memory. Anything that changes pixels (size, style, outline, hinting,
//! distance fields) flushes the cache wholesale rather than trying to
//! version keys.

use std::sync::Arc;

use rastype_core::cache::{CacheMetrics, TwoLevelCache};
use rastype_core::error::RenderError;
use rastype_core::GlyphId;

use crate::raster::RasterGlyph;

/// Hot tier, sized for a couple of lines of distinct glyphs
const L1_CAPACITY: usize = 256;
/// Warm tier for everything that fell out of L1
const L2_CAPACITY: usize = 1024;

/// Number of horizontal subpixel positions cached per glyph
pub(crate) const PHASE_BUCKETS: u8 = 4;

/// What distinguishes one cached mask from another within a single font
///
/// Size, style, outline, and hinting are deliberately absent: changing
/// any of them flushes the whole cache, so every live entry shares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GlyphKey {
    pub glyph_id: GlyphId,
    /// Quarter-pixel phase bucket, 0..[`PHASE_BUCKETS`]
    pub phase: u8,
    pub lcd: bool,
    pub sdf: bool,
}

impl GlyphKey {
    /// The canonical key for metrics lookups: whole-pixel grayscale
    pub fn base(glyph_id: GlyphId) -> Self {
        Self {
            glyph_id,
            phase: 0,
            lcd: false,
            sdf: false,
        }
    }
}

pub(crate) struct GlyphCache {
    inner: TwoLevelCache<GlyphKey, Arc<RasterGlyph>>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self {
            inner: TwoLevelCache::new(L1_CAPACITY, L2_CAPACITY),
        }
    }

    /// Returns the cached mask for `key`, rasterizing through `build` on
    /// a miss
    pub fn get_or_build(
        &self,
        key: GlyphKey,
        build: impl FnOnce() -> Result<RasterGlyph, RenderError>,
    ) -> Result<Arc<RasterGlyph>, RenderError> {
        if let Some(hit) = self.inner.get(&key) {
            return Ok(hit);
        }
        let glyph = Arc::new(build()?);
        self.inner.insert(key, Arc::clone(&glyph));
        Ok(glyph)
    }

    /// Drops every cached mask. Called whenever a font setting that
    /// shapes pixels changes.
    pub fn flush(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.inner.metrics()
    }
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastype_core::GlyphMetrics;

    fn dummy_glyph(advance: i32) -> RasterGlyph {
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
            lcd: false,
        }
    }

    #[test]
    fn build_runs_once_per_key() {
        let cache = GlyphCache::new();
        let mut builds = 0;

        for _ in 0..3 {
            let glyph = cache
                .get_or_build(GlyphKey::base(42), || {
                    builds += 1;
                    Ok(dummy_glyph(7))
                })
                .unwrap();
            assert_eq!(glyph.metrics.advance, 7);
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn phase_and_mode_make_distinct_entries() {
        let cache = GlyphCache::new();
        let keys = [
            GlyphKey::base(1),
            GlyphKey { phase: 1, ..GlyphKey::base(1) },
            GlyphKey { lcd: true, ..GlyphKey::base(1) },
            GlyphKey { sdf: true, ..GlyphKey::base(1) },
        ];
        for (i, key) in keys.iter().enumerate() {
            cache
                .get_or_build(*key, || Ok(dummy_glyph(i as i32)))
                .unwrap();
        }
        assert_eq!(cache.len(), keys.len());
    }

    #[test]
    fn build_errors_are_not_cached() {
        let cache = GlyphCache::new();
        let err = cache.get_or_build(GlyphKey::base(9), || {
            Err(RenderError::SizeOverflow {
                width: 9000,
                height: 1,
            })
        });
        assert!(err.is_err());
        assert_eq!(cache.len(), 0);

        // A later successful build still lands
        cache
            .get_or_build(GlyphKey::base(9), || Ok(dummy_glyph(1)))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn flush_empties_everything() {
        let cache = GlyphCache::new();
        cache
            .get_or_build(GlyphKey::base(5), || Ok(dummy_glyph(5)))
            .unwrap();
        cache.flush();
        assert_eq!(cache.len(), 0);
    }
}
