mod fonts;
mod model;
mod persistence;

pub use fonts::load_tileset;
pub use model::{BackendKind, PowerPreference, RendererConfig, TilesetConfig, ViewportConfig};
pub use persistence::{
    config_base_dir, config_path, load_config, load_config_from, save_config, save_config_to,
};
