//! Console render pipeline and its bind group layout.

use crate::renderer::uniforms::{DrawState, SAMPLER_BINDING, TextureUnit, UNIFORM_BINDING};

/// Format of the offscreen framebuffer the console is drawn into.
pub const FRAMEBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn texture_entry(unit: TextureUnit, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: unit.index(),
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type,
        },
        count: None,
    }
}

/// Creates the console pipeline and its bind group layout.
///
/// Bindings:
///   0: t_tileset (texture_2d<f32>, sampled)
///   1: t_console_bg (texture_2d<f32>, loaded)
///   2: t_console_fg (texture_2d<f32>, loaded)
///   3: t_console_tile (texture_2d<u32>, loaded)
///   4: Console uniforms
///   5: nearest sampler
///
/// The fixed-function state comes from `state`; only [`DrawState::OPAQUE`] is
/// expressible (no blending, culling, depth, stencil, or coverage).
pub fn create_console_pipeline(
    device: &wgpu::Device,
    state: &DrawState,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader_src = include_str!("shaders/console.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("console_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("console_bind_group_layout"),
        entries: &[
            texture_entry(
                TextureUnit::Tileset,
                wgpu::TextureSampleType::Float { filterable: true },
            ),
            texture_entry(
                TextureUnit::Background,
                wgpu::TextureSampleType::Float { filterable: false },
            ),
            texture_entry(
                TextureUnit::Foreground,
                wgpu::TextureSampleType::Float { filterable: false },
            ),
            texture_entry(TextureUnit::Tiles, wgpu::TextureSampleType::Uint),
            wgpu::BindGroupLayoutEntry {
                binding: UNIFORM_BINDING,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("console_pipeline_layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("console_render_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Sint8x2,
                    offset: 0,
                    shader_location: 0,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: FRAMEBUFFER_FORMAT,
                blend: state.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            cull_mode: state.cull_face.then_some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: state.alpha_to_coverage,
        },
        multiview_mask: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

/// Nearest-neighbour sampler: every texel is discrete cell or tile data.
pub fn create_nearest_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("console_nearest_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
