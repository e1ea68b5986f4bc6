//! Pixel surfaces produced by rendering
//!
//! Two layouts cover the four render tiers. `Index8` is one palette index
//! per pixel: a binary render carries a two-entry palette with entry 0 as
//! the transparent color key, an antialiased paletted render carries a
//! 256-entry ramp from background to foreground. `Argb8888` is four bytes
//! per pixel, a packed ARGB word stored little-endian, used by the
//! alpha-blended and subpixel tiers.

use crate::error::RenderError;
use crate::Color;

/// How pixels are arranged in a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// One byte per pixel, indexing the surface palette
    Index8,
    /// Four bytes per pixel: a u32 `0xAARRGGBB`, little-endian in memory
    Argb8888,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Index8 => 1,
            PixelLayout::Argb8888 => 4,
        }
    }
}

/// Color table for `Index8` surfaces
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<Color>,
}

impl Palette {
    pub fn new(entries: Vec<Color>) -> Self {
        Self { entries }
    }

    /// 256-entry linear ramp from `bg` (index 0) to `fg` (index 255)
    ///
    /// Index i blends each channel as `bg + i * (fg - bg) / 255`, so the
    /// endpoints reproduce the requested colors exactly.
    pub fn ramp(bg: Color, fg: Color) -> Self {
        let mut entries = Vec::with_capacity(256);
        for i in 0..256i32 {
            let mix = |b: u8, f: u8| (b as i32 + i * (f as i32 - b as i32) / 255) as u8;
            entries.push(Color::rgba(
                mix(bg.r, fg.r),
                mix(bg.g, fg.g),
                mix(bg.b, fg.b),
                mix(bg.a, fg.a),
            ));
        }
        Self { entries }
    }

    pub fn get(&self, index: u8) -> Option<Color> {
        self.entries.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Color] {
        &self.entries
    }
}

/// A rendered block of pixels
///
/// Row r starts at byte `r * pitch`. The buffer length is always
/// `pitch * height`.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pitch: usize,
    layout: PixelLayout,
    data: Vec<u8>,
    palette: Option<Palette>,
    color_key: Option<u8>,
}

impl Surface {
    /// Paletted surface, zero-filled (index 0)
    pub fn new_index8(
        width: u32,
        height: u32,
        palette: Palette,
        color_key: Option<u8>,
    ) -> Result<Self, RenderError> {
        let pitch = width as usize;
        let size = Self::checked_size(width, height, pitch)?;
        Ok(Self {
            width,
            height,
            pitch,
            layout: PixelLayout::Index8,
            data: vec![0; size],
            palette: Some(palette),
            color_key,
        })
    }

    /// 32-bit ARGB surface, fully transparent
    pub fn new_argb8888(width: u32, height: u32) -> Result<Self, RenderError> {
        let pitch = width as usize * 4;
        let size = Self::checked_size(width, height, pitch)?;
        Ok(Self {
            width,
            height,
            pitch,
            layout: PixelLayout::Argb8888,
            data: vec![0; size],
            palette: None,
            color_key: None,
        })
    }

    fn checked_size(width: u32, height: u32, pitch: usize) -> Result<usize, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        pitch
            .checked_mul(height as usize)
            .filter(|size| *size <= i32::MAX as usize)
            .ok_or(RenderError::InvalidDimensions { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Palette index treated as fully transparent, if any
    pub fn color_key(&self) -> Option<u8> {
        self.color_key
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch;
        &self.data[start..start + self.pitch]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.pitch;
        &mut self.data[start..start + self.pitch]
    }

    pub fn fill_index(&mut self, index: u8) {
        debug_assert_eq!(self.layout, PixelLayout::Index8);
        self.data.fill(index);
    }

    pub fn fill_argb(&mut self, color: Color) {
        debug_assert_eq!(self.layout, PixelLayout::Argb8888);
        let px = pack_argb(color);
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn put_index(&mut self, x: u32, y: u32, index: u8) {
        debug_assert_eq!(self.layout, PixelLayout::Index8);
        self.data[y as usize * self.pitch + x as usize] = index;
    }

    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        debug_assert_eq!(self.layout, PixelLayout::Index8);
        self.data[y as usize * self.pitch + x as usize]
    }

    pub fn put_argb(&mut self, x: u32, y: u32, color: Color) {
        debug_assert_eq!(self.layout, PixelLayout::Argb8888);
        let off = y as usize * self.pitch + x as usize * 4;
        self.data[off..off + 4].copy_from_slice(&pack_argb(color));
    }

    pub fn argb_at(&self, x: u32, y: u32) -> Color {
        debug_assert_eq!(self.layout, PixelLayout::Argb8888);
        let off = y as usize * self.pitch + x as usize * 4;
        unpack_argb([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }

    /// Flatten to tightly packed RGBA bytes, resolving palette and color key
    ///
    /// Color-keyed pixels come out fully transparent. An `Index8` pixel
    /// outside the palette degrades to opaque gray of its own value.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        match self.layout {
            PixelLayout::Index8 => {
                for y in 0..self.height {
                    for &index in &self.row(y)[..self.width as usize] {
                        if self.color_key == Some(index) {
                            out.extend_from_slice(&[0, 0, 0, 0]);
                            continue;
                        }
                        let color = self
                            .palette
                            .as_ref()
                            .and_then(|p| p.get(index))
                            .unwrap_or(Color::rgba(index, index, index, 255));
                        out.extend_from_slice(&[color.r, color.g, color.b, color.a]);
                    }
                }
            }
            PixelLayout::Argb8888 => {
                for y in 0..self.height {
                    for px in self.row(y)[..self.width as usize * 4].chunks_exact(4) {
                        let color = unpack_argb([px[0], px[1], px[2], px[3]]);
                        out.extend_from_slice(&[color.r, color.g, color.b, color.a]);
                    }
                }
            }
        }
        out
    }
}

fn pack_argb(color: Color) -> [u8; 4] {
    let word = ((color.a as u32) << 24)
        | ((color.r as u32) << 16)
        | ((color.g as u32) << 8)
        | (color.b as u32);
    word.to_le_bytes()
}

fn unpack_argb(bytes: [u8; 4]) -> Color {
    let word = u32::from_le_bytes(bytes);
    Color::rgba(
        ((word >> 16) & 0xFF) as u8,
        ((word >> 8) & 0xFF) as u8,
        (word & 0xFF) as u8,
        ((word >> 24) & 0xFF) as u8,
    )
}
