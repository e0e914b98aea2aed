//! Tileset aliases: map glyph codes to tile coordinates inside an atlas texture.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use fontdue::{Font, FontSettings};

use super::{Console, ConsoleError};

/// Column/row of a tile inside the atlas, in tile units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TilePosition {
    pub column: u16,
    pub row: u16,
}

impl TilePosition {
    pub const fn new(column: u16, row: u16) -> Self {
        TilePosition { column, row }
    }
}

/// Identity of an atlas's pixel contents. Backends re-upload the atlas only
/// when the identity they last saw changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtlasId(u64);

impl AtlasId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        AtlasId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Borrowed view of an atlas: RGBA8 texels, rows top-down.
#[derive(Clone, Copy, Debug)]
pub struct AtlasImage<'a> {
    pub id: AtlasId,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

/// Capability set a console renderer needs from a tileset.
pub trait TilesetAlias {
    /// Atlas shape in tiles: `[columns, rows]`.
    fn alias_shape(&self) -> [f32; 2];

    /// Size of one tile in atlas pixels: `[width, height]`.
    fn alias_tile_size(&self) -> [f32; 2];

    /// Atlas to sample while drawing `console`.
    fn atlas(&self, console: &Console) -> AtlasImage<'_>;

    /// Tile coordinate for a glyph code.
    fn tile_position(&self, glyph: u32) -> TilePosition;
}

/// Fixed grid of equally sized tiles in one RGBA8 atlas.
///
/// Glyph `i` maps to tile `i` unless remapped; glyphs past the last tile
/// map to tile 0.
#[derive(Clone, Debug)]
pub struct GridTileset {
    id: AtlasId,
    columns: u32,
    rows: u32,
    tile_width: u32,
    tile_height: u32,
    pixels: Vec<u8>,
    remapped: HashMap<u32, u16>,
}

impl GridTileset {
    /// Wraps an RGBA8 atlas of `columns x rows` tiles.
    pub fn from_rgba(
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, ConsoleError> {
        if columns == 0 || rows == 0 || tile_width == 0 || tile_height == 0 {
            return Err(ConsoleError::EmptyTileset {
                columns,
                rows,
                tile_width,
                tile_height,
            });
        }
        let tile_count = columns as u64 * rows as u64;
        if tile_count > u16::MAX as u64 + 1 {
            return Err(ConsoleError::TilesetTooLarge(tile_count));
        }
        let width = columns * tile_width;
        let height = rows * tile_height;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ConsoleError::AtlasSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(GridTileset {
            id: AtlasId::next(),
            columns,
            rows,
            tile_width,
            tile_height,
            pixels,
            remapped: HashMap::new(),
        })
    }

    /// Procedural atlas: tile `i` is an opaque white checker pattern whose
    /// phase depends on `i`, tile 0 (and 32, the space) fully transparent.
    pub fn checkerboard(
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, ConsoleError> {
        let width = columns as usize * tile_width as usize;
        let height = rows as usize * tile_height as usize;
        let mut pixels = vec![0u8; width * height * 4];
        for y in 0..height {
            for x in 0..width {
                let (tx, ty) = (x / tile_width.max(1) as usize, y / tile_height.max(1) as usize);
                let index = ty * columns as usize + tx;
                if index == 0 || index == b' ' as usize {
                    continue;
                }
                let (lx, ly) = (x % tile_width as usize, y % tile_height as usize);
                if (lx + ly + index) % 2 == 0 {
                    let o = (y * width + x) * 4;
                    pixels[o..o + 4].copy_from_slice(&[255, 255, 255, 255]);
                }
            }
        }
        Self::from_rgba(columns, rows, tile_width, tile_height, pixels)
    }

    /// Rasterizes glyph codes `0..columns * rows` from a TrueType/OpenType font,
    /// one glyph per tile. Coverage becomes alpha over white.
    pub fn from_font(
        font_data: &[u8],
        font_size: f32,
        columns: u32,
        rows: u32,
    ) -> Result<Self, ConsoleError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| ConsoleError::Font(e.to_string()))?;
        let line = font
            .horizontal_line_metrics(font_size)
            .ok_or_else(|| ConsoleError::Font("font has no horizontal line metrics".into()))?;
        let ascent = line.ascent.ceil() as i32;
        let descent = line.descent.ceil() as i32;
        let tile_height = (ascent - descent).max(1) as u32;
        let (m_metrics, _) = font.rasterize('M', font_size);
        let tile_width = m_metrics.advance_width.round().max(1.0) as u32;

        let atlas_width = (columns * tile_width) as usize;
        let mut pixels = vec![0u8; atlas_width * (rows * tile_height) as usize * 4];
        for code in 0..columns * rows {
            let Some(ch) = char::from_u32(code).filter(|c| !c.is_control()) else {
                continue;
            };
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            let origin_x = ((code % columns) * tile_width) as i32;
            let origin_y = ((code / columns) * tile_height) as i32;
            let left = metrics.xmin + (tile_width as i32 - metrics.advance_width.round() as i32) / 2;
            let top = ascent - (metrics.height as i32 + metrics.ymin);
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let (lx, ly) = (left + gx as i32, top + gy as i32);
                    if lx < 0 || ly < 0 || lx >= tile_width as i32 || ly >= tile_height as i32 {
                        continue;
                    }
                    let coverage = bitmap[gy * metrics.width + gx];
                    let px = (origin_x + lx) as usize;
                    let py = (origin_y + ly) as usize;
                    let o = (py * atlas_width + px) * 4;
                    pixels[o..o + 4].copy_from_slice(&[255, 255, 255, coverage]);
                }
            }
        }
        Self::from_rgba(columns, rows, tile_width, tile_height, pixels)
    }

    /// Points `glyph` at tile `index` (row-major). Indices past the atlas are clamped to tile 0.
    pub fn remap(&mut self, glyph: u32, index: u16) {
        let index = if (index as u32) < self.tile_count() { index } else { 0 };
        self.remapped.insert(glyph, index);
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn atlas_width(&self) -> u32 {
        self.columns * self.tile_width
    }

    pub fn atlas_height(&self) -> u32 {
        self.rows * self.tile_height
    }

    fn tile_index(&self, glyph: u32) -> u32 {
        if let Some(&index) = self.remapped.get(&glyph) {
            return index as u32;
        }
        if glyph < self.tile_count() { glyph } else { 0 }
    }
}

impl TilesetAlias for GridTileset {
    fn alias_shape(&self) -> [f32; 2] {
        [self.columns as f32, self.rows as f32]
    }

    fn alias_tile_size(&self) -> [f32; 2] {
        [self.tile_width as f32, self.tile_height as f32]
    }

    fn atlas(&self, _console: &Console) -> AtlasImage<'_> {
        AtlasImage {
            id: self.id,
            width: self.atlas_width(),
            height: self.atlas_height(),
            pixels: &self.pixels,
        }
    }

    fn tile_position(&self, glyph: u32) -> TilePosition {
        let index = self.tile_index(glyph);
        // tile_count <= 65536 keeps both components within u16.
        TilePosition {
            column: (index % self.columns) as u16,
            row: (index / self.columns) as u16,
        }
    }
}
