use thiserror::Error;

/// Errors raised while building consoles, tilesets, and images.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{what} holds {actual} entries, expected {expected} for a {width}x{height} grid")]
    ShapeMismatch {
        what: &'static str,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("atlas of {actual} bytes does not match {width}x{height} RGBA8 ({expected} bytes)")]
    AtlasSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("tileset shape must be non-zero, got {columns}x{rows} tiles of {tile_width}x{tile_height}px")]
    EmptyTileset {
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("tileset has {0} tiles, more than a 16-bit tile coordinate can address")]
    TilesetTooLarge(u64),
    #[error("font error: {0}")]
    Font(String),
}
