use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::RendererConfig;

/// Returns the platform-specific base config directory.
///
/// Resolution order:
/// 1. `XDG_CONFIG_HOME`
/// 2. `$HOME/.config`
/// 3. `%USERPROFILE%/.config`
pub fn config_base_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    if let Some(home) = std::env::var_os("HOME") {
        return Some(PathBuf::from(home).join(".config"));
    }
    std::env::var_os("USERPROFILE").map(|home| PathBuf::from(home).join(".config"))
}

/// Returns the path to `~/.config/tessera/config.ron`.
pub fn config_path() -> Option<PathBuf> {
    config_base_dir().map(|base| base.join("tessera").join("config.ron"))
}

/// Loads the config from the default location, falling back to defaults on any error.
pub fn load_config() -> RendererConfig {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => RendererConfig::default(),
    }
}

/// Loads the config from `path`. A missing file yields defaults silently; an
/// unparsable one yields defaults with a warning.
pub fn load_config_from(path: &Path) -> RendererConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return RendererConfig::default();
    };
    ron::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring malformed config");
        RendererConfig::default()
    })
}

/// Persists the config to `path`, creating parent directories.
pub fn save_config_to(config: &RendererConfig, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let pretty = ron::ser::PrettyConfig::default();
    let serialized = ron::ser::to_string_pretty(config, pretty)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, serialized)
}

/// Persists the config to the default location. Errors are logged and otherwise ignored.
pub fn save_config(config: &RendererConfig) {
    let Some(path) = config_path() else {
        return;
    };
    if let Err(e) = save_config_to(config, &path) {
        warn!(path = %path.display(), error = %e, "failed to save config");
    }
}
