//! CPU-side layout of per-cell data destined for the console layer textures.

use crate::core::{TilePosition, TilesetAlias};

/// Bytes per texel of the tile-coordinate layer.
pub const TILE_TEXEL_BYTES: usize = 4;

/// Smallest power of two `>= i`. Zero rounds up to one; `None` above `2^31`.
pub fn round_up_to_power_of_two(i: u32) -> Option<u32> {
    i.max(1).checked_next_power_of_two()
}

/// Splits both 16-bit coordinates into low/high bytes:
/// `[column_lo, column_hi, row_lo, row_hi]`.
///
/// `shaders/console.wgsl` reassembles the same layout; both sides must change together.
#[inline]
pub fn pack_tile(tile: TilePosition) -> [u8; 4] {
    let [column_lo, column_hi] = tile.column.to_le_bytes();
    let [row_lo, row_hi] = tile.row.to_le_bytes();
    [column_lo, column_hi, row_lo, row_hi]
}

#[inline]
pub fn unpack_tile(texel: [u8; 4]) -> TilePosition {
    TilePosition {
        column: u16::from_le_bytes([texel[0], texel[1]]),
        row: u16::from_le_bytes([texel[2], texel[3]]),
    }
}

/// Resolves every glyph through `alias` and writes the packed coordinates
/// into `out`, row-major, four bytes per cell. `out` is resized to fit.
pub fn pack_tiles<A: TilesetAlias + ?Sized>(alias: &A, glyphs: &[u32], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(glyphs.len() * TILE_TEXEL_BYTES);
    for &glyph in glyphs {
        out.extend_from_slice(&pack_tile(alias.tile_position(glyph)));
    }
}

/// Expands tightly packed RGB8 into RGBA8 with opaque alpha.
pub fn rgb_to_rgba(rgb: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
}
