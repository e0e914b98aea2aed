//! Software device: runs the console pipeline on the CPU.
//!
//! The framebuffer is kept with its origin at the bottom-left like a GL
//! default framebuffer, so readback hands out rows bottom-up.

mod composite;

use tracing::{debug, warn};

use crate::core::{AtlasId, AtlasImage, RowOrder};

use super::device::{Extent, Framebuffer, GpuDevice, Layer, Viewport};
use super::error::RenderError;
use super::uniforms::{ConsoleUniforms, DrawState, QUAD_VERTEX_COUNT, QUAD_VERTICES};

use composite::{LayerViews, TexelView};

/// Largest layer texture side accepted, matching common GPU limits.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Counters of the work a device performed; used by tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub layer_allocations: u64,
    pub layer_uploads: u64,
    pub atlas_uploads: u64,
    pub draws: u64,
}

#[derive(Default)]
struct LayerStore {
    storage: Option<Extent>,
    texels: Vec<u8>,
}

struct AtlasStore {
    id: AtlasId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// CPU implementation of [`GpuDevice`].
pub struct SoftwareDevice {
    viewport: Viewport,
    framebuffer: Vec<u8>,
    layers: [LayerStore; 3],
    atlas: Option<AtlasStore>,
    uniforms: ConsoleUniforms,
    draw_state: DrawState,
    stats: DeviceStats,
}

impl SoftwareDevice {
    pub fn new(width: u32, height: u32) -> Self {
        SoftwareDevice {
            viewport: Viewport {
                x: 0,
                y: 0,
                width,
                height,
            },
            framebuffer: vec![0; width as usize * height as usize * 4],
            layers: Default::default(),
            atlas: None,
            uniforms: ConsoleUniforms::default(),
            draw_state: DrawState::OPAQUE,
            stats: DeviceStats::default(),
        }
    }

    /// Changes the viewport size. The framebuffer is cleared.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.framebuffer = vec![0; width as usize * height as usize * 4];
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw_state
    }

    /// Storage size of `layer`, if allocated.
    pub fn layer_storage(&self, layer: Layer) -> Option<Extent> {
        self.layers[layer.slot()].storage
    }

    /// Raw texels of `layer` in storage layout (rows of the padded width).
    pub fn layer_texels(&self, layer: Layer) -> &[u8] {
        &self.layers[layer.slot()].texels
    }

    fn layer_view(&self, layer: Layer) -> TexelView<'_> {
        let store = &self.layers[layer.slot()];
        let storage = store.storage.unwrap_or_default();
        TexelView {
            width: storage.width,
            height: storage.height,
            bytes_per_texel: layer.bytes_per_texel(),
            texels: &store.texels,
        }
    }

    /// Inverts the affine part of the transform: clip-space to quad space.
    fn unproject(&self, clip: [f32; 2]) -> Option<[f32; 2]> {
        let m = &self.uniforms.mvp_matrix;
        if m[0][0] == 0.0 || m[1][1] == 0.0 {
            return None;
        }
        Some([(clip[0] - m[3][0]) / m[0][0], (clip[1] - m[3][1]) / m[1][1]])
    }

    /// Bounding box of the quad in quad space, from the vertex data.
    fn quad_bounds() -> ([f32; 2], [f32; 2]) {
        let mut lo = [f32::MAX; 2];
        let mut hi = [f32::MIN; 2];
        for v in QUAD_VERTICES.chunks_exact(4).take(QUAD_VERTEX_COUNT as usize) {
            for axis in 0..2 {
                lo[axis] = lo[axis].min(v[axis] as f32);
                hi[axis] = hi[axis].max(v[axis] as f32);
            }
        }
        (lo, hi)
    }
}

impl GpuDevice for SoftwareDevice {
    fn reset_draw_state(&mut self, state: &DrawState) -> Result<(), RenderError> {
        self.draw_state = *state;
        Ok(())
    }

    fn max_texture_dimension(&self) -> u32 {
        MAX_TEXTURE_DIMENSION
    }

    fn allocate_layer(&mut self, layer: Layer, extent: Extent) -> Result<(), RenderError> {
        if extent.width > MAX_TEXTURE_DIMENSION || extent.height > MAX_TEXTURE_DIMENSION {
            return Err(RenderError::GraphicsState {
                call_site: "allocate_layer",
                message: format!("{extent:?} exceeds {MAX_TEXTURE_DIMENSION}"),
            });
        }
        let store = &mut self.layers[layer.slot()];
        store.storage = Some(extent);
        store.texels = vec![0; extent.area() * layer.bytes_per_texel()];
        self.stats.layer_allocations += 1;
        debug!(layer = layer.label(), ?extent, "software layer allocated");
        Ok(())
    }

    fn write_layer(&mut self, layer: Layer, extent: Extent, texels: &[u8]) -> Result<(), RenderError> {
        layer.check_len(extent, texels)?;
        let store = &mut self.layers[layer.slot()];
        let storage = match store.storage {
            Some(storage) if extent.fits_in(storage) => storage,
            other => {
                return Err(RenderError::GraphicsState {
                    call_site: "write_layer",
                    message: format!("{extent:?} does not fit layer storage {other:?}"),
                });
            }
        };
        let bpt = layer.bytes_per_texel();
        let src_stride = extent.width as usize * bpt;
        let dst_stride = storage.width as usize * bpt;
        if src_stride > 0 {
            for (y, row) in texels.chunks_exact(src_stride).enumerate() {
                let o = y * dst_stride;
                store.texels[o..o + src_stride].copy_from_slice(row);
            }
        }
        self.stats.layer_uploads += 1;
        Ok(())
    }

    fn bind_atlas(&mut self, atlas: &AtlasImage<'_>) -> Result<(), RenderError> {
        if self.atlas.as_ref().is_some_and(|a| a.id == atlas.id) {
            return Ok(());
        }
        let expected = atlas.width as usize * atlas.height as usize * 4;
        if atlas.pixels.len() != expected {
            return Err(RenderError::GraphicsState {
                call_site: "bind_atlas",
                message: format!("atlas holds {} bytes, expected {expected}", atlas.pixels.len()),
            });
        }
        self.atlas = Some(AtlasStore {
            id: atlas.id,
            width: atlas.width,
            height: atlas.height,
            pixels: atlas.pixels.to_vec(),
        });
        self.stats.atlas_uploads += 1;
        Ok(())
    }

    fn write_uniforms(&mut self, uniforms: &ConsoleUniforms) -> Result<(), RenderError> {
        self.uniforms = *uniforms;
        Ok(())
    }

    fn draw_quad(&mut self) -> Result<(), RenderError> {
        if !self.draw_state.is_opaque() {
            warn!(state = ?self.draw_state, "software device ignores non-opaque draw state");
        }
        let Viewport { width, height, .. } = self.viewport;
        let mut framebuffer = std::mem::take(&mut self.framebuffer);
        let views = LayerViews {
            atlas: self.atlas.as_ref().map(|a| TexelView {
                width: a.width,
                height: a.height,
                bytes_per_texel: 4,
                texels: &a.pixels,
            }),
            bg: self.layer_view(Layer::Background),
            fg: self.layer_view(Layer::Foreground),
            tiles: self.layer_view(Layer::Tiles),
        };
        let (lo, hi) = Self::quad_bounds();
        // Window rows count up from the bottom edge.
        for py in 0..height {
            for px in 0..width {
                let clip = [
                    (px as f32 + 0.5) / width as f32 * 2.0 - 1.0,
                    (py as f32 + 0.5) / height as f32 * 2.0 - 1.0,
                ];
                let Some(vertex) = self.unproject(clip) else {
                    continue;
                };
                if vertex[0] < lo[0] || vertex[0] > hi[0] || vertex[1] < lo[1] || vertex[1] > hi[1] {
                    continue;
                }
                let coords = [vertex[0], 1.0 - vertex[1]];
                let rgba = composite::shade(&self.uniforms, &views, coords);
                let o = (py as usize * width as usize + px as usize) * 4;
                framebuffer[o..o + 4].copy_from_slice(&rgba);
            }
        }
        self.framebuffer = framebuffer;
        self.stats.draws += 1;
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn read_framebuffer(&mut self) -> Result<Framebuffer, RenderError> {
        Ok(Framebuffer {
            width: self.viewport.width,
            height: self.viewport.height,
            data: self.framebuffer.clone(),
            row_order: RowOrder::BottomUp,
        })
    }

    fn layer_allocations(&self) -> u64 {
        self.stats.layer_allocations
    }
}
