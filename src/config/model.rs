use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: BackendKind,
    pub power_preference: PowerPreference,
    pub viewport: ViewportConfig,
    pub tileset: TilesetConfig,
}

/// Selects which device a [`crate::renderer::RendererBackend`] drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackendKind {
    Gpu,
    Cpu,
    /// GPU when an adapter is available, software otherwise.
    #[default]
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesetConfig {
    /// TrueType/OpenType font rasterized into the atlas. `None` uses a
    /// procedural checkerboard atlas.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub columns: u32,
    pub rows: u32,
    /// Tile size of the procedural atlas; font atlases derive it from the font.
    pub tile_width: u32,
    pub tile_height: u32,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 14.0,
            columns: 16,
            rows: 16,
            tile_width: 8,
            tile_height: 16,
        }
    }
}
