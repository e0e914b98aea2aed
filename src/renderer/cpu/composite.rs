//! Per-pixel composite, mirroring `fs_main` in `shaders/console.wgsl`.

use crate::renderer::packing::unpack_tile;
use crate::renderer::uniforms::ConsoleUniforms;

/// Read-only view of one texture's texels, rows top-down.
#[derive(Clone, Copy)]
pub(super) struct TexelView<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_texel: usize,
    pub texels: &'a [u8],
}

impl TexelView<'_> {
    /// Fetches texel `(x, y)`, clamped to the edge. Missing channels read as 255.
    fn load(&self, x: i64, y: i64) -> [u8; 4] {
        if self.width == 0 || self.height == 0 || self.texels.is_empty() {
            return [0, 0, 0, 0];
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let o = (y * self.width as usize + x) * self.bytes_per_texel;
        let mut out = [255u8; 4];
        out[..self.bytes_per_texel].copy_from_slice(&self.texels[o..o + self.bytes_per_texel]);
        out
    }

    /// Nearest-neighbour sample at normalized `uv`.
    fn sample_nearest(&self, uv: [f32; 2]) -> [u8; 4] {
        let x = (uv[0] * self.width as f32).floor() as i64;
        let y = (uv[1] * self.height as f32).floor() as i64;
        self.load(x, y)
    }
}

pub(super) struct LayerViews<'a> {
    pub atlas: Option<TexelView<'a>>,
    pub bg: TexelView<'a>,
    pub fg: TexelView<'a>,
    pub tiles: TexelView<'a>,
}

fn fract(v: f32) -> f32 {
    v - v.floor()
}

fn unorm(c: u8) -> f32 {
    c as f32 / 255.0
}

/// Shades one fragment. `coords` is the interpolated `v_coords` varying:
/// `(0, 0)` at the top-left of the console, `(1, 1)` at the bottom-right.
pub(super) fn shade(u: &ConsoleUniforms, views: &LayerViews<'_>, coords: [f32; 2]) -> [u8; 4] {
    let mut cell = [0i64; 2];
    let mut interp = [0f32; 2];
    for axis in 0..2 {
        let texel = coords[axis] * u.console_size[axis] * u.console_shape[axis];
        cell[axis] = texel.floor() as i64;
        // Tiles under one pixel (or degenerate sizes) collapse to the tile center.
        let half = (0.5 / u.tiles_size[axis]).min(0.5);
        interp[axis] = if half.is_finite() {
            fract(texel).clamp(half, 1.0 - half)
        } else {
            0.5
        };
    }

    let tile = unpack_tile(views.tiles.load(cell[0], cell[1]));
    let address = [tile.column as f32, tile.row as f32];
    let atlas_uv = [
        (address[0] + interp[0]) / u.tiles_shape[0],
        (address[1] + interp[1]) / u.tiles_shape[1],
    ];
    let glyph = views
        .atlas
        .map(|atlas| atlas.sample_nearest(atlas_uv))
        .unwrap_or([0, 0, 0, 0]);

    let bg = views.bg.load(cell[0], cell[1]);
    let fg = views.fg.load(cell[0], cell[1]);
    let alpha = unorm(glyph[3]);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let fg_c = unorm(fg[c]) * unorm(glyph[c]);
        let bg_c = unorm(bg[c]);
        out[c] = ((bg_c + (fg_c - bg_c) * alpha) * 255.0).round() as u8;
    }
    out[3] = 255;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TilePosition;
    use crate::renderer::packing::pack_tile;

    fn uniforms_for(cells: [u32; 2], padded: [u32; 2]) -> ConsoleUniforms {
        ConsoleUniforms {
            tiles_shape: [2.0, 1.0],
            tiles_size: [2.0, 2.0],
            console_shape: [padded[0] as f32, padded[1] as f32],
            console_size: [
                cells[0] as f32 / padded[0] as f32,
                cells[1] as f32 / padded[1] as f32,
            ],
            ..ConsoleUniforms::default()
        }
    }

    #[test]
    fn opaque_glyph_shows_foreground_and_blank_shows_background() {
        // Atlas: tile 0 transparent, tile 1 opaque white (2x1 tiles of 2x2 px).
        let mut atlas = vec![0u8; 4 * 2 * 4];
        for y in 0..2 {
            for x in 2..4 {
                let o = (y * 4 + x) * 4;
                atlas[o..o + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let bg = [10, 20, 30, 40, 50, 60];
        let fg = [200, 100, 0, 0, 100, 200];
        let mut tiles = Vec::new();
        tiles.extend_from_slice(&pack_tile(TilePosition::new(1, 0)));
        tiles.extend_from_slice(&pack_tile(TilePosition::new(0, 0)));

        let views = LayerViews {
            atlas: Some(TexelView {
                width: 4,
                height: 2,
                bytes_per_texel: 4,
                texels: &atlas,
            }),
            bg: TexelView {
                width: 2,
                height: 1,
                bytes_per_texel: 3,
                texels: &bg,
            },
            fg: TexelView {
                width: 2,
                height: 1,
                bytes_per_texel: 3,
                texels: &fg,
            },
            tiles: TexelView {
                width: 2,
                height: 1,
                bytes_per_texel: 4,
                texels: &tiles,
            },
        };
        let u = uniforms_for([2, 1], [2, 1]);
        assert_eq!(shade(&u, &views, [0.25, 0.5]), [200, 100, 0, 255]);
        assert_eq!(shade(&u, &views, [0.75, 0.5]), [40, 50, 60, 255]);
    }

    #[test]
    fn degenerate_tile_sizes_sample_tile_center() {
        let atlas = [255u8; 4];
        let bg = [1, 2, 3];
        let fg = [4, 5, 6];
        let tiles = pack_tile(TilePosition::new(0, 0));
        let views = LayerViews {
            atlas: Some(TexelView {
                width: 1,
                height: 1,
                bytes_per_texel: 4,
                texels: &atlas,
            }),
            bg: TexelView {
                width: 1,
                height: 1,
                bytes_per_texel: 3,
                texels: &bg,
            },
            fg: TexelView {
                width: 1,
                height: 1,
                bytes_per_texel: 3,
                texels: &fg,
            },
            tiles: TexelView {
                width: 1,
                height: 1,
                bytes_per_texel: 4,
                texels: &tiles,
            },
        };
        for size in [0.0, -0.0, 0.25, -3.0, f32::NAN, f32::INFINITY] {
            let u = ConsoleUniforms {
                tiles_shape: [1.0, 1.0],
                tiles_size: [size, size],
                console_shape: [1.0, 1.0],
                console_size: [1.0, 1.0],
                ..ConsoleUniforms::default()
            };
            assert_eq!(shade(&u, &views, [0.3, 0.7]), [4, 5, 6, 255], "tile size {size}");
        }
    }

    #[test]
    fn missing_atlas_and_empty_layers_do_not_panic() {
        let empty = TexelView {
            width: 1,
            height: 1,
            bytes_per_texel: 3,
            texels: &[],
        };
        let views = LayerViews {
            atlas: None,
            bg: empty,
            fg: empty,
            tiles: TexelView {
                bytes_per_texel: 4,
                ..empty
            },
        };
        let u = uniforms_for([0, 0], [1, 1]);
        assert_eq!(shade(&u, &views, [0.5, 0.5]), [0, 0, 0, 255]);
    }
}
