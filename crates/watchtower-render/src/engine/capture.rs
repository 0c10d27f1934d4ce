//! Pixel readback of the display and render targets.

use super::RenderEngine;
use crate::buffer::aligned_bytes_per_row;
use crate::error::{RenderError, RenderResult};

impl RenderEngine {
    /// Reads back the headless display image as RGBA8, top row first.
    pub fn capture_display(&self) -> RenderResult<Vec<u8>> {
        let texture = self.display_texture.as_ref().ok_or_else(|| {
            RenderError::CaptureUnavailable("windowed engines present to the surface".into())
        })?;
        self.read_texture(texture, self.width, self.height)
    }

    /// Reads back the render target of `slot` as RGBA8, top row first.
    pub fn capture_target(&self, slot: usize) -> RenderResult<Vec<u8>> {
        let target = self
            .targets
            .get(slot)
            .ok_or_else(|| RenderError::CaptureUnavailable(format!("no render target {slot}")))?;
        self.read_texture(&target.texture, target.size.width, target.size.height)
    }

    fn read_texture(
        &self,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
    ) -> RenderResult<Vec<u8>> {
        let bytes_per_row = aligned_bytes_per_row(width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
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

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::ReadbackFailed)?
            .map_err(|_| RenderError::ReadbackFailed)?;

        // Strip row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = width as usize * 4;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in data.chunks(bytes_per_row as usize).take(height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }

        drop(data);
        buffer.unmap();

        Ok(pixels)
    }
}
