use proptest::prelude::*;

use super::cpu::SoftwareDevice;
use super::packing::pack_tile;
use super::{ConsoleRenderer, DrawState, Extent, GpuDevice, Layer, RenderError, RendererState};
use crate::core::{AtlasId, AtlasImage, Color, Console, Tile, TilePosition, TilesetAlias};

const TILE_PX: u32 = 8;

/// 16x16 atlas of 8x8 tiles: tile (0, 0) transparent, every other tile opaque white.
struct StubAlias {
    id: AtlasId,
    pixels: Vec<u8>,
}

impl StubAlias {
    fn new() -> Self {
        let side = (16 * TILE_PX) as usize;
        let mut pixels = vec![255u8; side * side * 4];
        for y in 0..TILE_PX as usize {
            for x in 0..TILE_PX as usize {
                let o = (y * side + x) * 4;
                pixels[o..o + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
        StubAlias {
            id: AtlasId::next(),
            pixels,
        }
    }
}

impl TilesetAlias for StubAlias {
    fn alias_shape(&self) -> [f32; 2] {
        [16.0, 16.0]
    }

    fn alias_tile_size(&self) -> [f32; 2] {
        [TILE_PX as f32, TILE_PX as f32]
    }

    fn atlas(&self, _console: &Console) -> AtlasImage<'_> {
        AtlasImage {
            id: self.id,
            width: 16 * TILE_PX,
            height: 16 * TILE_PX,
            pixels: &self.pixels,
        }
    }

    fn tile_position(&self, glyph: u32) -> TilePosition {
        // Deliberately not the identity so packing is observable.
        TilePosition::new((glyph * 3 % 16) as u16, (glyph / 16 % 16) as u16)
    }
}

fn renderer_for(cols: u32, rows: u32) -> ConsoleRenderer<SoftwareDevice, StubAlias> {
    let device = SoftwareDevice::new(cols * TILE_PX, rows * TILE_PX);
    ConsoleRenderer::new(device, StubAlias::new()).unwrap()
}

fn cell_color(index: u32) -> (Color, Color) {
    let fg = Color::rgb(200, (index * 20) as u8, 17);
    let bg = Color::rgb(3, 60, (index * 25) as u8);
    (fg, bg)
}

/// Cell `(x, y)` gets glyph `first + x + y * cols` (0 stays blank) and distinct colors.
fn patterned_console(cols: u32, rows: u32, first: u32) -> Console {
    let mut console = Console::new(cols, rows);
    for y in 0..rows {
        for x in 0..cols {
            let index = x + y * cols;
            let (fg, bg) = cell_color(index);
            let glyph = if index == 0 { 0 } else { first + index };
            console.set(x, y, Tile { glyph, fg, bg });
        }
    }
    console
}

fn center_pixel(image: &crate::core::Image, x: u32, y: u32) -> [u8; 4] {
    image
        .pixel(x * TILE_PX + TILE_PX / 2, y * TILE_PX + TILE_PX / 2)
        .unwrap()
}

fn rgba(color: Color) -> [u8; 4] {
    [color.r, color.g, color.b, 255]
}

#[test]
fn starts_unsized_without_layer_storage() {
    let renderer = renderer_for(2, 2);
    assert_eq!(renderer.state(), RendererState::Unsized);
    assert_eq!(renderer.texture_extent(), None);
    assert_eq!(renderer.device().layer_allocations(), 0);
    assert_eq!(renderer.device().layer_storage(Layer::Tiles), None);
}

#[test]
fn first_render_sizes_layers_to_powers_of_two() {
    let mut renderer = renderer_for(5, 3);
    renderer.render(&patterned_console(5, 3, 1)).unwrap();

    assert_eq!(renderer.state(), RendererState::Sized { width: 5, height: 3 });
    assert_eq!(renderer.texture_extent(), Some(Extent::new(8, 4)));
    for layer in Layer::ALL {
        assert_eq!(renderer.device().layer_storage(layer), Some(Extent::new(8, 4)));
    }
    let uniforms = renderer.uniforms();
    assert_eq!(uniforms.console_shape, [8.0, 4.0]);
    assert_eq!(uniforms.console_size, [5.0 / 8.0, 0.75]);
    assert_eq!(uniforms.tiles_shape, [16.0, 16.0]);
    assert_eq!(uniforms.tiles_size, [8.0, 8.0]);
}

#[test]
fn packed_tile_data_for_cell_1_1_matches_alias() {
    let mut renderer = renderer_for(2, 2);
    let mut console = Console::new(2, 2);
    let glyphs = [[65, 66], [67, 68]];
    for y in 0..2u32 {
        for x in 0..2u32 {
            let (fg, bg) = cell_color(x + y * 2);
            console.set(
                x,
                y,
                Tile {
                    glyph: glyphs[y as usize][x as usize],
                    fg,
                    bg,
                },
            );
        }
    }
    renderer.render(&console).unwrap();

    let expected = pack_tile(renderer.alias().tile_position(68));
    assert_eq!(expected, [12, 0, 4, 0]);
    assert_eq!(&renderer.tile_texels()[12..16], &expected);

    // Storage is 2x2 already, so cell (1, 1) sits at texel index 3.
    let stored = renderer.device().layer_texels(Layer::Tiles);
    assert_eq!(&stored[12..16], &expected);
}

#[test]
fn same_size_rerender_only_sub_uploads() {
    let mut renderer = renderer_for(3, 3);
    renderer.render(&patterned_console(3, 3, 1)).unwrap();
    assert_eq!(renderer.device().layer_allocations(), 3);

    let mut second = patterned_console(3, 3, 1);
    second.set(
        1,
        1,
        Tile {
            glyph: 0,
            fg: Color::WHITE,
            bg: Color::rgb(9, 99, 199),
        },
    );
    second.set(
        0,
        0,
        Tile {
            glyph: 42,
            fg: Color::rgb(250, 10, 10),
            bg: Color::BLACK,
        },
    );
    renderer.render(&second).unwrap();

    let stats = renderer.device().stats();
    assert_eq!(stats.layer_allocations, 3);
    assert_eq!(stats.layer_uploads, 6);
    assert_eq!(stats.draws, 2);
    assert_eq!(stats.atlas_uploads, 1);

    let image = renderer.read_pixels().unwrap();
    assert_eq!(center_pixel(&image, 1, 1), [9, 99, 199, 255]);
    assert_eq!(center_pixel(&image, 0, 0), [250, 10, 10, 255]);
    let (fg, _) = cell_color(8);
    assert_eq!(center_pixel(&image, 2, 2), rgba(fg));
}

#[test]
fn dimension_change_reallocates_every_layer() {
    let mut renderer = renderer_for(4, 4);
    renderer.render(&patterned_console(4, 4, 1)).unwrap();
    renderer.render(&patterned_console(4, 2, 1)).unwrap();
    assert_eq!(renderer.device().layer_allocations(), 6);
    assert_eq!(renderer.texture_extent(), Some(Extent::new(4, 2)));

    // Same padded size but different logical size still counts as a change.
    renderer.render(&patterned_console(3, 2, 1)).unwrap();
    assert_eq!(renderer.device().layer_allocations(), 9);
    assert_eq!(renderer.uniforms().console_size, [0.75, 1.0]);
}

#[test]
fn read_pixels_is_top_down() {
    let mut renderer = renderer_for(2, 2);
    let mut console = Console::new(2, 2);
    console.clear(0, Color::WHITE, Color::BLACK);
    let red = Color::rgb(255, 0, 0);
    console.set(
        0,
        0,
        Tile {
            glyph: 1,
            fg: red,
            bg: Color::BLACK,
        },
    );
    renderer.render(&console).unwrap();

    let image = renderer.read_pixels().unwrap();
    assert_eq!((image.width(), image.height()), (16, 16));
    assert_eq!(image.pixel(0, 0), Some(rgba(red)));
    assert_eq!(image.pixel(0, 15), Some([0, 0, 0, 255]));
}

#[test]
fn glyph_pixels_blend_foreground_over_background() {
    let mut renderer = renderer_for(3, 2);
    let console = patterned_console(3, 2, 1);
    renderer.render(&console).unwrap();
    let image = renderer.read_pixels().unwrap();

    for y in 0..2 {
        for x in 0..3 {
            let tile = console.get(x, y).unwrap();
            let expected = if tile.glyph == 0 { tile.bg } else { tile.fg };
            assert_eq!(center_pixel(&image, x, y), rgba(expected), "cell ({x}, {y})");
        }
    }
}

#[test]
fn read_pixels_leaves_renderer_state_alone() {
    let mut renderer = renderer_for(2, 2);
    renderer.render(&patterned_console(2, 2, 1)).unwrap();
    let state = renderer.state();
    let uniforms = *renderer.uniforms();
    let stats = renderer.device().stats();

    let first = renderer.read_pixels().unwrap();
    let second = renderer.read_pixels().unwrap();

    assert_eq!(first, second);
    assert_eq!(renderer.state(), state);
    assert_eq!(*renderer.uniforms(), uniforms);
    assert_eq!(renderer.device().stats(), stats);
}

#[test]
fn empty_console_renders_and_reads_back_viewport() {
    let device = SoftwareDevice::new(12, 7);
    let mut renderer = ConsoleRenderer::new(device, StubAlias::new()).unwrap();
    renderer.render(&Console::new(0, 0)).unwrap();

    assert_eq!(renderer.state(), RendererState::Sized { width: 0, height: 0 });
    assert_eq!(renderer.texture_extent(), Some(Extent::new(1, 1)));
    assert_eq!(renderer.uniforms().console_size, [0.0, 0.0]);
    assert!(renderer.tile_texels().is_empty());

    let image = renderer.read_pixels().unwrap();
    assert_eq!((image.width(), image.height()), (12, 7));
}

#[test]
fn draw_state_is_forced_every_frame() {
    let mut renderer = renderer_for(1, 1);
    let scissored = DrawState {
        scissor_test: true,
        blend: true,
        ..DrawState::OPAQUE
    };
    renderer.device_mut().reset_draw_state(&scissored).unwrap();
    renderer.render(&patterned_console(1, 1, 1)).unwrap();
    assert_eq!(renderer.device().draw_state(), DrawState::OPAQUE);
}

#[test]
fn oversized_console_is_rejected_and_stays_unsized() {
    let mut renderer = renderer_for(1, 1);
    let err = renderer.render(&Console::new(9000, 1)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ConsoleTooLarge {
            width: 9000,
            limit: 8192,
            ..
        }
    ));
    assert_eq!(renderer.state(), RendererState::Unsized);
    assert_eq!(renderer.device().layer_allocations(), 0);
}

#[test]
fn unpaddable_console_is_rejected_not_panicking() {
    let mut renderer = renderer_for(1, 1);
    let err = renderer.render(&Console::new(u32::MAX, 0)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ConsoleTooLarge {
            width: u32::MAX,
            height: 0,
            ..
        }
    ));
    let err = renderer.render(&Console::new(0, (1 << 31) + 1)).unwrap_err();
    assert!(matches!(err, RenderError::ConsoleTooLarge { .. }));
    assert_eq!(renderer.state(), RendererState::Unsized);
    assert_eq!(renderer.device().layer_allocations(), 0);
}

/// Reports a zero tile size, which no real atlas has.
struct ZeroTileAlias(StubAlias);

impl TilesetAlias for ZeroTileAlias {
    fn alias_shape(&self) -> [f32; 2] {
        self.0.alias_shape()
    }

    fn alias_tile_size(&self) -> [f32; 2] {
        [0.0, 0.0]
    }

    fn atlas(&self, console: &Console) -> AtlasImage<'_> {
        self.0.atlas(console)
    }

    fn tile_position(&self, glyph: u32) -> TilePosition {
        self.0.tile_position(glyph)
    }
}

#[test]
fn zero_tile_size_alias_still_renders() {
    let device = SoftwareDevice::new(TILE_PX, TILE_PX);
    let mut renderer = ConsoleRenderer::new(device, ZeroTileAlias(StubAlias::new())).unwrap();
    renderer.render(&patterned_console(1, 1, 1)).unwrap();
    let image = renderer.read_pixels().unwrap();
    assert_eq!((image.width(), image.height()), (TILE_PX, TILE_PX));
}

#[test]
fn into_parts_returns_device_and_alias() {
    let mut renderer = renderer_for(1, 1);
    renderer.render(&patterned_console(1, 1, 1)).unwrap();
    let (device, alias) = renderer.into_parts();
    assert_eq!(device.stats().draws, 1);
    assert_eq!(alias.alias_shape(), [16.0, 16.0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_size_never_reallocates(width in 0u32..40, height in 0u32..40) {
        let device = SoftwareDevice::new(16, 16);
        let mut renderer = ConsoleRenderer::new(device, StubAlias::new()).unwrap();

        renderer.render(&patterned_console(width, height, 1)).unwrap();
        prop_assert_eq!(renderer.device().layer_allocations(), 3);
        renderer.read_pixels().unwrap();
        renderer.render(&patterned_console(width, height, 7)).unwrap();

        prop_assert_eq!(renderer.device().layer_allocations(), 3);
        prop_assert_eq!(renderer.state(), RendererState::Sized { width, height });
    }
}
