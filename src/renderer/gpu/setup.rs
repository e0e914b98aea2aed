//! wgpu device initialization and resource creation helpers.

use tracing::info;
use wgpu::util::DeviceExt;

use crate::config::{PowerPreference, RendererConfig};
use crate::renderer::device::{Extent, Viewport};
use crate::renderer::error::RenderError;
use crate::renderer::uniforms::{ConsoleUniforms, DrawState, QUAD_VERTICES};

use super::pipelines::{self, FRAMEBUFFER_FORMAT};
use super::GpuTexture;

impl super::WgpuDevice {
    /// Opens a headless wgpu device and builds the console pipeline with a
    /// viewport of the configured size.
    pub fn headless(config: &RendererConfig) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let power_preference = match config.power_preference {
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|_| RenderError::NoAdapter)?;
        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "using wgpu adapter"
        );

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            }))
            .map_err(|e| RenderError::DeviceRequest(e.to_string()))?;

        Self::from_device(device, queue, config.viewport.width, config.viewport.height)
    }

    /// Builds the console pipeline on an existing device (e.g. one shared with a windowing layer).
    ///
    /// Shader or pipeline errors are fatal: everything created so far is
    /// dropped and [`RenderError::ResourceCreation`] is returned.
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let draw_state = DrawState::OPAQUE;
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let (pipeline, bind_group_layout) = pipelines::create_console_pipeline(&device, &draw_state);
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(RenderError::ResourceCreation {
                resource: "console pipeline",
                message: err.to_string(),
            });
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("console_quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("console_uniforms"),
            contents: bytemuck::bytes_of(&ConsoleUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = pipelines::create_nearest_sampler(&device);

        let viewport = Viewport {
            x: 0,
            y: 0,
            width: width.max(1),
            height: height.max(1),
        };
        let framebuffer = Self::create_framebuffer(&device, viewport);

        Ok(super::WgpuDevice {
            device,
            queue,
            pipeline,
            bind_group_layout,
            draw_state,
            vertex_buffer,
            uniform_buffer,
            sampler,
            layers: [None, None, None],
            atlas: None,
            framebuffer,
            viewport,
            staging: Vec::new(),
            layer_allocations: 0,
        })
    }

    // ── Texture helpers ──────────────────────────────────────────────

    pub(super) fn create_texture(
        device: &wgpu::Device,
        extent: Extent,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> GpuTexture {
        let extent = Extent::new(extent.width.max(1), extent.height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTexture {
            texture,
            view,
            extent,
        }
    }

    fn create_framebuffer(device: &wgpu::Device, viewport: Viewport) -> GpuTexture {
        Self::create_texture(
            device,
            Extent::new(viewport.width, viewport.height),
            FRAMEBUFFER_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            "console_framebuffer",
        )
    }

    /// Resizes the offscreen framebuffer. Layer textures are untouched.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        let w = width.max(1);
        let h = height.max(1);
        if w == self.viewport.width && h == self.viewport.height {
            return;
        }
        self.viewport.width = w;
        self.viewport.height = h;
        self.framebuffer = Self::create_framebuffer(&self.device, self.viewport);
    }
}
