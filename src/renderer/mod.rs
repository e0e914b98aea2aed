//! Console renderer: turns a [`Console`] into three layer textures plus an
//! atlas and composites them with one full-screen quad.
//!
//! Backends:
//! 1. [`gpu::WgpuDevice`]: wgpu render pipeline into an offscreen framebuffer
//! 2. [`cpu::SoftwareDevice`]: CPU emulation of the same pipeline
//!
//! [`RendererBackend`] picks one at runtime.

pub mod backend;
pub mod cpu;
pub mod device;
mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod packing;
pub mod uniforms;

use tracing::{debug, trace};

use crate::core::{Console, Image, TilesetAlias};

pub use backend::RendererBackend;
pub use device::{Extent, Framebuffer, GpuDevice, Layer, Viewport};
pub use error::RenderError;
pub use uniforms::{ConsoleUniforms, DrawState, TextureUnit};

use packing::pack_tiles;

/// Observable sizing state of a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    /// No render yet; layer textures have no storage.
    Unsized,
    /// Layer storage exists for a console of this many cells.
    Sized { width: u32, height: u32 },
}

/// Renders consoles through a [`GpuDevice`] using glyphs from a [`TilesetAlias`].
///
/// Layer textures are reallocated only when the console's dimensions change;
/// consoles of constant size cost one sub-upload per layer per frame.
pub struct ConsoleRenderer<D, A> {
    device: D,
    alias: A,
    uniforms: ConsoleUniforms,
    cached_size: Option<Extent>,
    tile_texels: Vec<u8>,
}

impl<D: GpuDevice, A: TilesetAlias> ConsoleRenderer<D, A> {
    /// Takes ownership of the device and alias and uploads the fixed transform.
    pub fn new(mut device: D, alias: A) -> Result<Self, RenderError> {
        let uniforms = ConsoleUniforms::default();
        device.write_uniforms(&uniforms)?;
        Ok(ConsoleRenderer {
            device,
            alias,
            uniforms,
            cached_size: None,
            tile_texels: Vec::new(),
        })
    }

    /// Draws `console` over the whole viewport.
    pub fn render(&mut self, console: &Console) -> Result<(), RenderError> {
        let extent = Extent::new(console.width(), console.height());
        trace!(width = extent.width, height = extent.height, "render console");

        self.device.reset_draw_state(&DrawState::OPAQUE)?;

        self.uniforms.tiles_shape = self.alias.alias_shape();
        self.uniforms.tiles_size = self.alias.alias_tile_size();
        if self.cached_size != Some(extent) {
            self.resize_layers(extent)?;
        }
        self.device.write_uniforms(&self.uniforms)?;

        let atlas = self.alias.atlas(console);
        self.device.bind_atlas(&atlas)?;

        self.device
            .write_layer(Layer::Background, extent, console.bg_bytes())?;
        self.device
            .write_layer(Layer::Foreground, extent, console.fg_bytes())?;
        pack_tiles(&self.alias, console.glyphs(), &mut self.tile_texels);
        self.device
            .write_layer(Layer::Tiles, extent, &self.tile_texels)?;

        self.device.draw_quad()
    }

    fn resize_layers(&mut self, extent: Extent) -> Result<(), RenderError> {
        let limit = self.device.max_texture_dimension();
        let padded = match extent.padded() {
            Some(padded) if padded.width <= limit && padded.height <= limit => padded,
            _ => {
                return Err(RenderError::ConsoleTooLarge {
                    width: extent.width,
                    height: extent.height,
                    limit,
                });
            }
        };
        debug!(
            from = ?self.cached_size,
            to = ?extent,
            padded = ?padded,
            "reallocating console layers"
        );

        self.uniforms.console_shape = [padded.width as f32, padded.height as f32];
        self.uniforms.console_size = [
            extent.width as f32 / padded.width as f32,
            extent.height as f32 / padded.height as f32,
        ];
        for layer in Layer::ALL {
            self.device.allocate_layer(layer, padded)?;
        }
        // Cached only once every layer has storage.
        self.cached_size = Some(extent);
        Ok(())
    }

    /// Captures the current viewport as a top-down RGBA8 image.
    ///
    /// Renderer state is left untouched; `&mut` is only needed to map device memory.
    pub fn read_pixels(&mut self) -> Result<Image, RenderError> {
        let Framebuffer {
            width,
            height,
            data,
            row_order,
        } = self.device.read_framebuffer()?;
        Image::from_rows(width, height, data, row_order)
            .map_err(|e| RenderError::Readback(e.to_string()))
    }

    pub fn state(&self) -> RendererState {
        match self.cached_size {
            None => RendererState::Unsized,
            Some(Extent { width, height }) => RendererState::Sized { width, height },
        }
    }

    /// Storage size of the layer textures, if allocated.
    pub fn texture_extent(&self) -> Option<Extent> {
        self.cached_size.and_then(Extent::padded)
    }

    pub fn uniforms(&self) -> &ConsoleUniforms {
        &self.uniforms
    }

    /// Packed tile coordinates uploaded by the last render, row-major.
    pub fn tile_texels(&self) -> &[u8] {
        &self.tile_texels
    }

    pub fn alias(&self) -> &A {
        &self.alias
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_parts(self) -> (D, A) {
        (self.device, self.alias)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer.rs"]
mod tests;
