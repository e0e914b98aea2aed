//! Tessera: render a grid of character cells through a tile atlas with a
//! single full-screen quad.

pub mod config;
pub mod core;
pub mod renderer;

pub use crate::core::{Color, Console, GridTileset, Image, Tile, TilesetAlias};
pub use crate::renderer::{ConsoleRenderer, GpuDevice, RenderError, RendererBackend};
