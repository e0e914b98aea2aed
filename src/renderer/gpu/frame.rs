//! Per-frame GPU work: layer uploads, atlas binding, and the console pass.

use tracing::debug;

use crate::core::{AtlasImage, RowOrder};
use crate::renderer::device::{Extent, Framebuffer, GpuDevice, Layer, Viewport};
use crate::renderer::error::RenderError;
use crate::renderer::packing::rgb_to_rgba;
use crate::renderer::uniforms::{
    ConsoleUniforms, DrawState, QUAD_VERTEX_COUNT, SAMPLER_BINDING, TextureUnit, UNIFORM_BINDING,
};

use super::{AtlasTexture, GpuTexture, WgpuDevice};

/// Texture format backing each layer. Colors are widened to RGBA on upload.
fn layer_format(layer: Layer) -> wgpu::TextureFormat {
    match layer {
        Layer::Background | Layer::Foreground => wgpu::TextureFormat::Rgba8Unorm,
        Layer::Tiles => wgpu::TextureFormat::Rgba8Uint,
    }
}

fn write_region(queue: &wgpu::Queue, target: &GpuTexture, extent: Extent, data: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(extent.width * 4),
            rows_per_image: Some(extent.height),
        },
        wgpu::Extent3d {
            width: extent.width,
            height: extent.height,
            depth_or_array_layers: 1,
        },
    );
}

impl WgpuDevice {
    fn layer_texture(&self, layer: Layer) -> Result<&GpuTexture, RenderError> {
        self.layers[layer.slot()]
            .as_ref()
            .ok_or(RenderError::GraphicsState {
                call_site: "draw_quad",
                message: format!("{} has no storage", layer.label()),
            })
    }

    fn console_bind_group(&self) -> Result<wgpu::BindGroup, RenderError> {
        let atlas = self.atlas.as_ref().ok_or(RenderError::GraphicsState {
            call_site: "draw_quad",
            message: "no atlas bound".into(),
        })?;
        let bg = self.layer_texture(Layer::Background)?;
        let fg = self.layer_texture(Layer::Foreground)?;
        let tiles = self.layer_texture(Layer::Tiles)?;

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("console_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TextureUnit::Tileset.index(),
                    resource: wgpu::BindingResource::TextureView(&atlas.inner.view),
                },
                wgpu::BindGroupEntry {
                    binding: TextureUnit::Background.index(),
                    resource: wgpu::BindingResource::TextureView(&bg.view),
                },
                wgpu::BindGroupEntry {
                    binding: TextureUnit::Foreground.index(),
                    resource: wgpu::BindingResource::TextureView(&fg.view),
                },
                wgpu::BindGroupEntry {
                    binding: TextureUnit::Tiles.index(),
                    resource: wgpu::BindingResource::TextureView(&tiles.view),
                },
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }
}

impl GpuDevice for WgpuDevice {
    fn reset_draw_state(&mut self, state: &DrawState) -> Result<(), RenderError> {
        // Blend, cull, depth and friends are baked into the pipeline; the pass
        // sets its own viewport and scissor, so there is nothing left to clear.
        if *state != self.draw_state {
            return Err(RenderError::GraphicsState {
                call_site: "reset_draw_state",
                message: format!("pipeline was built for {:?}, got {state:?}", self.draw_state),
            });
        }
        Ok(())
    }

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn allocate_layer(&mut self, layer: Layer, extent: Extent) -> Result<(), RenderError> {
        let limit = self.max_texture_dimension();
        if extent.width > limit || extent.height > limit {
            return Err(RenderError::GraphicsState {
                call_site: "allocate_layer",
                message: format!("{extent:?} exceeds {limit}"),
            });
        }
        let texture = self.checked("allocate_layer", || {
            Self::create_texture(
                &self.device,
                extent,
                layer_format(layer),
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                layer.label(),
            )
        })?;
        self.layers[layer.slot()] = Some(texture);
        self.layer_allocations += 1;
        debug!(layer = layer.label(), ?extent, "gpu layer allocated");
        Ok(())
    }

    fn write_layer(&mut self, layer: Layer, extent: Extent, texels: &[u8]) -> Result<(), RenderError> {
        layer.check_len(extent, texels)?;
        let storage = self.layers[layer.slot()].as_ref().map(|t| t.extent);
        match storage {
            Some(storage) if extent.fits_in(storage) => {}
            other => {
                return Err(RenderError::GraphicsState {
                    call_site: "write_layer",
                    message: format!("{extent:?} does not fit layer storage {other:?}"),
                });
            }
        }
        if extent.is_empty() {
            return Ok(());
        }

        if layer != Layer::Tiles {
            rgb_to_rgba(texels, &mut self.staging);
        }
        let data = match layer {
            Layer::Tiles => texels,
            Layer::Background | Layer::Foreground => &self.staging[..],
        };
        let Some(target) = self.layers[layer.slot()].as_ref() else {
            return Ok(());
        };
        self.checked("write_layer", || write_region(&self.queue, target, extent, data))
    }

    fn bind_atlas(&mut self, atlas: &AtlasImage<'_>) -> Result<(), RenderError> {
        if self.atlas.as_ref().is_some_and(|a| a.id == atlas.id) {
            return Ok(());
        }
        let extent = Extent::new(atlas.width, atlas.height);
        let expected = extent.area() * 4;
        if atlas.pixels.len() != expected {
            return Err(RenderError::GraphicsState {
                call_site: "bind_atlas",
                message: format!("atlas holds {} bytes, expected {expected}", atlas.pixels.len()),
            });
        }
        let inner = self.checked("bind_atlas", || {
            let texture = Self::create_texture(
                &self.device,
                extent,
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                "console_tileset",
            );
            if !extent.is_empty() {
                write_region(&self.queue, &texture, extent, atlas.pixels);
            }
            texture
        })?;
        debug!(width = atlas.width, height = atlas.height, "atlas uploaded");
        self.atlas = Some(AtlasTexture { id: atlas.id, inner });
        Ok(())
    }

    fn write_uniforms(&mut self, uniforms: &ConsoleUniforms) -> Result<(), RenderError> {
        self.checked("write_uniforms", || {
            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        })
    }

    fn draw_quad(&mut self) -> Result<(), RenderError> {
        let bind_group = self.console_bind_group()?;
        let Viewport { width, height, .. } = self.viewport;

        self.checked("draw_quad", || {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("console_encoder"),
                });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("console_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.framebuffer.view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                pass.set_scissor_rect(0, 0, width, height);
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
            }
            self.queue.submit(std::iter::once(encoder.finish()));
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn read_framebuffer(&mut self) -> Result<Framebuffer, RenderError> {
        let data = self.read_framebuffer_rows()?;
        Ok(Framebuffer {
            width: self.viewport.width,
            height: self.viewport.height,
            data,
            row_order: RowOrder::TopDown,
        })
    }

    fn layer_allocations(&self) -> u64 {
        self.layer_allocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererConfig;
    use crate::core::{Color, Console, GridTileset};
    use crate::renderer::ConsoleRenderer;

    /// Headless device, or `None` on machines without an adapter.
    fn headless() -> Option<WgpuDevice> {
        let mut config = RendererConfig::default();
        config.viewport.width = 32;
        config.viewport.height = 32;
        WgpuDevice::headless(&config).ok()
    }

    #[test]
    fn every_state_change_passes_validation() {
        let Some(mut device) = headless() else {
            return;
        };
        let uniforms = ConsoleUniforms {
            console_shape: [4.0, 4.0],
            console_size: [0.5, 0.5],
            ..ConsoleUniforms::default()
        };
        device.write_uniforms(&uniforms).unwrap();
        device.reset_draw_state(&DrawState::OPAQUE).unwrap();
        device.allocate_layer(Layer::Tiles, Extent::new(4, 4)).unwrap();
        device
            .write_layer(Layer::Tiles, Extent::new(2, 2), &[0; 16])
            .unwrap();
        assert_eq!(device.layer_allocations(), 1);
    }

    #[test]
    fn rendered_background_reads_back_top_down() {
        let Some(device) = headless() else {
            return;
        };
        let tileset = GridTileset::checkerboard(16, 16, 8, 8).unwrap();
        let mut renderer = ConsoleRenderer::new(device, tileset).unwrap();
        let mut console = Console::new(1, 2);
        console.clear(0, Color::WHITE, Color::rgb(200, 0, 0));
        console.set_bg(0, 1, Color::rgb(0, 0, 200));
        renderer.render(&console).unwrap();

        let image = renderer.read_pixels().unwrap();
        assert_eq!(image.pixel(16, 4).map(|p| p[2]), Some(0));
        assert_eq!(image.pixel(16, 28).map(|p| p[0]), Some(0));
    }

    #[test]
    fn non_opaque_draw_state_is_refused() {
        let Some(mut device) = headless() else {
            return;
        };
        let blended = DrawState {
            blend: true,
            ..DrawState::OPAQUE
        };
        let err = device.reset_draw_state(&blended).unwrap_err();
        assert!(matches!(
            err,
            RenderError::GraphicsState {
                call_site: "reset_draw_state",
                ..
            }
        ));
    }
}
