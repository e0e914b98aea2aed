//! Framebuffer readback through a mappable staging buffer.

use std::sync::mpsc;

use crate::renderer::error::RenderError;

use super::WgpuDevice;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch for a texture-to-buffer copy, rounded up to the copy alignment.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding from a mapped copy, keeping rows in order.
pub(crate) fn strip_row_padding(padded: &[u8], width: u32, height: u32, pitch: u32) -> Vec<u8> {
    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in padded.chunks(pitch as usize).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }
    pixels
}

impl WgpuDevice {
    /// Copies the framebuffer into host memory, top row first.
    pub(super) fn read_framebuffer_rows(&self) -> Result<Vec<u8>, RenderError> {
        let width = self.viewport.width;
        let height = self.viewport.height;
        let pitch = padded_bytes_per_row(width);

        let staging = self.checked("read_framebuffer", || {
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("console_readback"),
                size: u64::from(pitch) * u64::from(height),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("console_readback_encoder"),
                });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &self.framebuffer.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(pitch),
                        rows_per_image: Some(height),
                    },
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
            self.queue.submit(std::iter::once(encoder.finish()));
            buffer
        })?;

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| RenderError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            strip_row_padding(&mapped, width, height, pitch)
        };
        staging.unmap();
        Ok(pixels)
    }
}
