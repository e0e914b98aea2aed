//! The seam between the console renderer and a concrete graphics device.

use crate::core::{AtlasImage, RowOrder};

use super::error::RenderError;
use super::packing::{TILE_TEXEL_BYTES, round_up_to_power_of_two};
use super::uniforms::{ConsoleUniforms, DrawState, TextureUnit};

/// One of the three per-cell layer textures owned by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Background color, RGB8 tightly packed.
    Background,
    /// Foreground color, RGB8 tightly packed.
    Foreground,
    /// Packed tile coordinates, RGBA8.
    Tiles,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Foreground, Layer::Tiles];

    /// Bytes per texel of the data handed to [`GpuDevice::write_layer`].
    pub const fn bytes_per_texel(self) -> usize {
        match self {
            Layer::Background | Layer::Foreground => 3,
            Layer::Tiles => TILE_TEXEL_BYTES,
        }
    }

    pub const fn unit(self) -> TextureUnit {
        match self {
            Layer::Background => TextureUnit::Background,
            Layer::Foreground => TextureUnit::Foreground,
            Layer::Tiles => TextureUnit::Tiles,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Layer::Background => 0,
            Layer::Foreground => 1,
            Layer::Tiles => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Layer::Background => "console_bg",
            Layer::Foreground => "console_fg",
            Layer::Tiles => "console_tile",
        }
    }

    /// Checks that `texels` exactly covers `extent`.
    pub fn check_len(self, extent: Extent, texels: &[u8]) -> Result<(), RenderError> {
        let expected = extent.area() * self.bytes_per_texel();
        if texels.len() != expected {
            return Err(RenderError::LayerSize {
                layer: self,
                expected,
                actual: texels.len(),
            });
        }
        Ok(())
    }
}

/// Width/height in texels (or cells).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Extent { width, height }
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Power-of-two storage size holding this extent, `None` if either side
    /// has no power of two in `u32`.
    pub fn padded(self) -> Option<Extent> {
        Some(Extent {
            width: round_up_to_power_of_two(self.width)?,
            height: round_up_to_power_of_two(self.height)?,
        })
    }

    /// True when `self` fits inside `storage`.
    pub fn fits_in(self, storage: Extent) -> bool {
        self.width <= storage.width && self.height <= storage.height
    }
}

/// Active viewport rectangle in framebuffer pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Raw RGBA8 pixels read back from a device, in the device's native row order.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub row_order: RowOrder,
}

/// GPU state a console renderer drives.
///
/// Implementors exclusively own their layer textures, shader program, and
/// quad vertex buffer; dropping the device releases them. All calls happen
/// on the thread owning the graphics context.
pub trait GpuDevice {
    /// Forces the fixed-function toggles for the next draw.
    fn reset_draw_state(&mut self, state: &DrawState) -> Result<(), RenderError>;

    /// Largest texture side the device accepts.
    fn max_texture_dimension(&self) -> u32;

    /// (Re)allocates storage for `layer` at `extent`. Contents are undefined.
    fn allocate_layer(&mut self, layer: Layer, extent: Extent) -> Result<(), RenderError>;

    /// Sub-uploads `texels` into the `(0, 0)..extent` region of `layer`.
    fn write_layer(&mut self, layer: Layer, extent: Extent, texels: &[u8]) -> Result<(), RenderError>;

    /// Binds the atlas to [`TextureUnit::Tileset`], uploading it if its identity changed.
    fn bind_atlas(&mut self, atlas: &AtlasImage<'_>) -> Result<(), RenderError>;

    fn write_uniforms(&mut self, uniforms: &ConsoleUniforms) -> Result<(), RenderError>;

    /// Draws the unit quad as a 4-vertex triangle strip and flushes.
    fn draw_quad(&mut self) -> Result<(), RenderError>;

    fn viewport(&self) -> Viewport;

    /// Reads the viewport's pixels.
    fn read_framebuffer(&mut self) -> Result<Framebuffer, RenderError>;

    /// Number of layer storage allocations performed so far.
    fn layer_allocations(&self) -> u64;
}
