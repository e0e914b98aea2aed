use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tessera::config::{self, RendererConfig};
use tessera::{Color, Console, ConsoleRenderer, RendererBackend};

const DEFAULT_OUTPUT: &str = "tessera.png";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let config = config::load_config();
    if config::config_path().is_some_and(|p| !p.exists()) {
        config::save_config(&config);
    }

    let tileset = config::load_tileset(&config.tileset)?;
    let columns = (config.viewport.width / tileset.tile_width().max(1)).max(1);
    let rows = (config.viewport.height / tileset.tile_height().max(1)).max(1);
    let console = demo_console(columns, rows);

    let backend = RendererBackend::new(&config).context("creating renderer backend")?;
    info!(backend = backend.name(), columns, rows, "rendering demo console");

    let mut renderer = ConsoleRenderer::new(backend, tileset)?;
    renderer.render(&console)?;
    let image = renderer.read_pixels()?;

    image::save_buffer(
        &output,
        image.raw_data(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", output.display()))?;
    info!(path = %output.display(), "wrote frame");
    Ok(())
}

/// Builds a console showing a banner over a diagonal color gradient, with
/// glyphs tinted from the 256-color palette.
fn demo_console(columns: u32, rows: u32) -> Console {
    let mut console = Console::new(columns, rows);
    console.clear(u32::from(b' '), Color::DEFAULT_FG, Color::DEFAULT_BG);

    let (start, end) = (Color::ANSI[4], Color::ANSI[13]);
    let span = (columns + rows).saturating_sub(2).max(1) as f32;
    for y in 0..rows {
        for x in 0..columns {
            console.set_bg(x, y, start.lerp(end, (x + y) as f32 / span));
            console.set_fg(x, y, Color::from_256(((y * columns + x) % 256) as u8));
            console.put_char(x, y, 0x21 + (x + y) % 94);
        }
    }

    let banner = " tessera ";
    let x = columns.saturating_sub(banner.len() as u32) / 2;
    console.print(x, rows / 2, banner, Color::WHITE, Color::BLACK);
    console
}
