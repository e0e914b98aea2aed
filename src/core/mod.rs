mod color;
mod console;
mod error;
mod image;
mod tileset;

pub use color::Color;
pub use console::{Console, Tile};
pub use error::ConsoleError;
pub use image::{Image, RowOrder};
pub use tileset::{AtlasId, AtlasImage, GridTileset, TilePosition, TilesetAlias};
