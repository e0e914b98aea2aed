//! GPU device backed by wgpu.
//!
//! One render pass per frame: the console pipeline draws a unit quad into an
//! offscreen framebuffer, sampling the atlas plus the three layer textures.

mod frame;
pub mod pipelines;
mod readback;
mod setup;

use crate::core::AtlasId;

use super::device::{Extent, Viewport};
use super::error::RenderError;
use super::uniforms::DrawState;

/// A texture plus its default view and storage size.
struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: Extent,
}

struct AtlasTexture {
    id: AtlasId,
    inner: GpuTexture,
}

/// wgpu implementation of [`super::GpuDevice`].
pub struct WgpuDevice {
    // wgpu core
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Pipeline
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    draw_state: DrawState,

    // Buffers
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,

    sampler: wgpu::Sampler,

    // Textures: bg, fg, tiles (indexed by Layer::slot), atlas, render target.
    layers: [Option<GpuTexture>; 3],
    atlas: Option<AtlasTexture>,
    framebuffer: GpuTexture,
    viewport: Viewport,

    // RGB -> RGBA expansion scratch, reused across frames.
    staging: Vec<u8>,
    layer_allocations: u64,
}

impl WgpuDevice {
    /// Runs `f` inside a validation error scope, reporting anything captured
    /// as a [`RenderError::GraphicsState`] tagged with `call_site`.
    fn checked<T>(&self, call_site: &'static str, f: impl FnOnce() -> T) -> Result<T, RenderError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        match pollster::block_on(scope.pop()) {
            None => Ok(value),
            Some(err) => {
                tracing::error!(call_site, error = %err, "wgpu validation error");
                Err(RenderError::GraphicsState {
                    call_site,
                    message: err.to_string(),
                })
            }
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The offscreen render target, for callers that present or post-process it.
    pub fn framebuffer_view(&self) -> &wgpu::TextureView {
        &self.framebuffer.view
    }

    pub fn framebuffer_texture(&self) -> &wgpu::Texture {
        &self.framebuffer.texture
    }
}
