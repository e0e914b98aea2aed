use tracing::{info, warn};

use crate::config::{BackendKind, RendererConfig};
use crate::core::AtlasImage;

use super::cpu::SoftwareDevice;
use super::device::{Extent, Framebuffer, GpuDevice, Layer, Viewport};
use super::error::RenderError;
use super::uniforms::{ConsoleUniforms, DrawState};

#[cfg(feature = "gpu")]
use super::gpu::WgpuDevice;

/// Enum-dispatch device: wgpu when available, software otherwise.
pub enum RendererBackend {
    Cpu(Box<SoftwareDevice>),
    #[cfg(feature = "gpu")]
    Gpu(Box<WgpuDevice>),
}

impl RendererBackend {
    /// Creates the backend named by `config.backend`.
    ///
    /// `Auto` tries wgpu first (if compiled in) and falls back to the
    /// software device; an explicit `Gpu` request fails instead.
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let (width, height) = (config.viewport.width, config.viewport.height);
        match config.backend {
            BackendKind::Cpu => Ok(Self::software(width, height)),
            BackendKind::Gpu => Self::wgpu(config),
            BackendKind::Auto => match Self::wgpu(config) {
                Ok(backend) => Ok(backend),
                Err(e) => {
                    warn!(error = %e, "GPU renderer unavailable, falling back to software");
                    Ok(Self::software(width, height))
                }
            },
        }
    }

    fn software(width: u32, height: u32) -> Self {
        info!(width, height, "using software renderer");
        RendererBackend::Cpu(Box::new(SoftwareDevice::new(width, height)))
    }

    #[cfg(feature = "gpu")]
    fn wgpu(config: &RendererConfig) -> Result<Self, RenderError> {
        let device = WgpuDevice::headless(config)?;
        info!("using GPU renderer (wgpu)");
        Ok(RendererBackend::Gpu(Box::new(device)))
    }

    #[cfg(not(feature = "gpu"))]
    fn wgpu(_config: &RendererConfig) -> Result<Self, RenderError> {
        Err(RenderError::NoAdapter)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RendererBackend::Cpu(_) => "software",
            #[cfg(feature = "gpu")]
            RendererBackend::Gpu(_) => "wgpu",
        }
    }

    /// Resizes the target framebuffer of whichever device is active.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        match self {
            RendererBackend::Cpu(cpu) => cpu.resize_viewport(width, height),
            #[cfg(feature = "gpu")]
            RendererBackend::Gpu(gpu) => gpu.resize_viewport(width, height),
        }
    }

    // ── Trait-object helpers ──────────────────────────────────────────

    fn as_device(&self) -> &dyn GpuDevice {
        match self {
            RendererBackend::Cpu(cpu) => cpu.as_ref(),
            #[cfg(feature = "gpu")]
            RendererBackend::Gpu(gpu) => gpu.as_ref(),
        }
    }

    fn as_device_mut(&mut self) -> &mut dyn GpuDevice {
        match self {
            RendererBackend::Cpu(cpu) => cpu.as_mut(),
            #[cfg(feature = "gpu")]
            RendererBackend::Gpu(gpu) => gpu.as_mut(),
        }
    }
}

impl GpuDevice for RendererBackend {
    fn reset_draw_state(&mut self, state: &DrawState) -> Result<(), RenderError> {
        self.as_device_mut().reset_draw_state(state)
    }

    fn max_texture_dimension(&self) -> u32 {
        self.as_device().max_texture_dimension()
    }

    fn allocate_layer(&mut self, layer: Layer, extent: Extent) -> Result<(), RenderError> {
        self.as_device_mut().allocate_layer(layer, extent)
    }

    fn write_layer(&mut self, layer: Layer, extent: Extent, texels: &[u8]) -> Result<(), RenderError> {
        self.as_device_mut().write_layer(layer, extent, texels)
    }

    fn bind_atlas(&mut self, atlas: &AtlasImage<'_>) -> Result<(), RenderError> {
        self.as_device_mut().bind_atlas(atlas)
    }

    fn write_uniforms(&mut self, uniforms: &ConsoleUniforms) -> Result<(), RenderError> {
        self.as_device_mut().write_uniforms(uniforms)
    }

    fn draw_quad(&mut self) -> Result<(), RenderError> {
        self.as_device_mut().draw_quad()
    }

    fn viewport(&self) -> Viewport {
        self.as_device().viewport()
    }

    fn read_framebuffer(&mut self) -> Result<Framebuffer, RenderError> {
        self.as_device_mut().read_framebuffer()
    }

    fn layer_allocations(&self) -> u64 {
        self.as_device().layer_allocations()
    }
}
