use std::fs;

use anyhow::Context;

use crate::core::GridTileset;

use super::TilesetConfig;

/// Builds the tileset described by `config`: a rasterized font when a path is
/// set, the procedural checkerboard otherwise.
pub fn load_tileset(config: &TilesetConfig) -> anyhow::Result<GridTileset> {
    match &config.font_path {
        Some(path) => {
            let data = fs::read(path)
                .with_context(|| format!("reading font {}", path.display()))?;
            GridTileset::from_font(&data, config.font_size, config.columns, config.rows)
                .with_context(|| format!("rasterizing font {}", path.display()))
        }
        None => GridTileset::checkerboard(
            config.columns,
            config.rows,
            config.tile_width,
            config.tile_height,
        )
        .context("building checkerboard tileset"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TilesetAlias;

    #[test]
    fn default_config_builds_checkerboard() {
        let tileset = load_tileset(&TilesetConfig::default()).unwrap();
        assert_eq!(tileset.alias_shape(), [16.0, 16.0]);
        assert_eq!(tileset.alias_tile_size(), [8.0, 16.0]);
    }

    #[test]
    fn missing_font_file_reports_path() {
        let config = TilesetConfig {
            font_path: Some("/nonexistent/font.ttf".into()),
            ..TilesetConfig::default()
        };
        let err = load_tileset(&config).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/font.ttf"));
    }
}
