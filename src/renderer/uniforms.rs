//! Uniform block and fixed pipeline state shared by every backend.
//!
//! All structs are `#[repr(C)]` with `bytemuck::Pod` so they can be
//! uploaded to GPU buffers with zero-copy.

/// Column-major matrix mapping the `[0, 1]²` quad onto the full viewport
/// (scale 2, translate -1 on both axes).
pub const FULLSCREEN_MVP: [[f32; 4]; 4] = [
    [2.0, 0.0, 0.0, 0.0],
    [0.0, 2.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [-1.0, -1.0, 0.0, 1.0],
];

/// Unit quad as a 4-vertex triangle strip. Each vertex is two `i8`
/// components padded to four bytes (vertex strides must be 4-aligned).
pub const QUAD_VERTICES: [i8; 16] = [0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0];

pub const QUAD_VERTEX_COUNT: u32 = 4;

/// Console uniform block (96 bytes, 16-byte aligned). Must match the WGSL `Console` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ConsoleUniforms {
    pub mvp_matrix: [[f32; 4]; 4],
    /// Atlas shape in tiles.
    pub tiles_shape: [f32; 2],
    /// One tile in atlas pixels.
    pub tiles_size: [f32; 2],
    /// Padded (power-of-two) layer texture size in cells.
    pub console_shape: [f32; 2],
    /// Fraction of the layer textures covered by the console.
    pub console_size: [f32; 2],
}

impl Default for ConsoleUniforms {
    fn default() -> Self {
        ConsoleUniforms {
            mvp_matrix: FULLSCREEN_MVP,
            tiles_shape: [1.0, 1.0],
            tiles_size: [1.0, 1.0],
            console_shape: [1.0, 1.0],
            console_size: [0.0, 0.0],
        }
    }
}

impl ConsoleUniforms {
    /// Applies the transform to a quad vertex, returning clip-space `(x, y)`.
    pub fn project(&self, vertex: [f32; 2]) -> [f32; 2] {
        let m = &self.mvp_matrix;
        [
            m[0][0] * vertex[0] + m[1][0] * vertex[1] + m[3][0],
            m[0][1] * vertex[0] + m[1][1] * vertex[1] + m[3][1],
        ]
    }
}

/// Texture unit (bind slot) of each sampled texture. Units 0-3 are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureUnit {
    Tileset = 0,
    Background = 1,
    Foreground = 2,
    Tiles = 3,
}

impl TextureUnit {
    pub const ALL: [TextureUnit; 4] = [
        TextureUnit::Tileset,
        TextureUnit::Background,
        TextureUnit::Foreground,
        TextureUnit::Tiles,
    ];

    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Sampler name in the shader.
    pub const fn sampler_name(self) -> &'static str {
        match self {
            TextureUnit::Tileset => "t_tileset",
            TextureUnit::Background => "t_console_bg",
            TextureUnit::Foreground => "t_console_fg",
            TextureUnit::Tiles => "t_console_tile",
        }
    }
}

/// Binding slot of the uniform block, after the four texture units.
pub const UNIFORM_BINDING: u32 = 4;
/// Binding slot of the nearest-filter sampler.
pub const SAMPLER_BINDING: u32 = 5;

/// Fixed-function toggles the renderer forces before every draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawState {
    pub blend: bool,
    pub cull_face: bool,
    pub depth_test: bool,
    pub polygon_offset_fill: bool,
    pub alpha_to_coverage: bool,
    pub sample_coverage: bool,
    pub scissor_test: bool,
    pub stencil_test: bool,
}

impl DrawState {
    /// Everything off: the composite writes every pixel of the viewport unconditionally.
    pub const OPAQUE: DrawState = DrawState {
        blend: false,
        cull_face: false,
        depth_test: false,
        polygon_offset_fill: false,
        alpha_to_coverage: false,
        sample_coverage: false,
        scissor_test: false,
        stencil_test: false,
    };

    pub fn is_opaque(&self) -> bool {
        *self == Self::OPAQUE
    }
}
