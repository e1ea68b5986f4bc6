//! Legacy `kern` table parsing
//!
//! Only the original horizontal format-0 subtables are read: sorted glyph
//! pairs with a signed adjustment in font units. That covers the fonts that
//! still ship pair kerning outside GPOS; the Apple extended layout
//! (version 1.0, 32-bit headers) is rare enough in the wild that we treat
//! it as "no kerning" rather than guess at its coverage semantics.

/// Parsed pair-kerning data, sorted for binary search
#[derive(Debug, Clone)]
pub(crate) struct KernTable {
    /// (left glyph << 16 | right glyph) -> adjustment in font units
    pairs: Vec<(u32, i16)>,
}

impl KernTable {
    /// Parse the raw `kern` table bytes; None when nothing usable is found
    pub(crate) fn parse(data: &[u8]) -> Option<Self> {
        // Version 1.0 (Apple) starts with 0x0001; the Microsoft layout we
        // handle starts with a zero u16.
        if read_u16(data, 0)? != 0 {
            return None;
        }
        let n_tables = read_u16(data, 2)? as usize;

        let mut pairs: Vec<(u32, i16)> = Vec::new();
        let mut offset = 4usize;
        for _ in 0..n_tables {
            let length = read_u16(data, offset + 2)? as usize;
            let coverage = read_u16(data, offset + 4)?;
            let format = coverage >> 8;
            let horizontal = coverage & 0x0001 != 0;
            let cross_stream = coverage & 0x0004 != 0;

            if format == 0 && horizontal && !cross_stream {
                let n_pairs = read_u16(data, offset + 6)? as usize;
                // Skip searchRange/entrySelector/rangeShift
                let mut pos = offset + 14;
                for _ in 0..n_pairs {
                    let left = read_u16(data, pos)? as u32;
                    let right = read_u16(data, pos + 2)? as u32;
                    let value = read_i16(data, pos + 4)?;
                    pairs.push((pair_key(left, right), value));
                    pos += 6;
                }
            }

            if length == 0 {
                // Malformed length would loop forever
                break;
            }
            offset += length;
        }

        if pairs.is_empty() {
            return None;
        }
        // First subtable wins for duplicated pairs
        pairs.sort_by_key(|&(key, _)| key);
        pairs.dedup_by_key(|&mut (key, _)| key);
        Some(Self { pairs })
    }

    /// Adjustment for the pair, font units; None when the pair is unkerned
    pub(crate) fn lookup(&self, left: u32, right: u32) -> Option<i16> {
        if left > 0xFFFF || right > 0xFFFF {
            return None;
        }
        let key = pair_key(left, right);
        self.pairs
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|idx| self.pairs[idx].1)
    }

    pub(crate) fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

fn pair_key(left: u32, right: u32) -> u32 {
    (left << 16) | right
}

fn read_u16(data: &[u8], pos: usize) -> Option<u16> {
    let bytes = data.get(pos..pos + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_i16(data: &[u8], pos: usize) -> Option<i16> {
    read_u16(data, pos).map(|v| v as i16)
}
