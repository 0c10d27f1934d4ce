//! Frame recording: the [`FrameBackend`] implementation.

use watchtower_core::{Camera, Destination, FrameBackend, Scene, ViewSource};

use super::{RenderEngine, ViewUniforms};
use crate::buffer::update_uniform;

/// A frame being recorded.
pub struct FrameInFlight {
    encoder: wgpu::CommandEncoder,
    surface_texture: Option<wgpu::SurfaceTexture>,
    display_view: wgpu::TextureView,
}

impl RenderEngine {
    /// Acquires the image the display pass will draw into.
    fn acquire_display(&mut self) -> Option<(Option<wgpu::SurfaceTexture>, wgpu::TextureView)> {
        if let Some(texture) = &self.display_texture {
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            return Some((None, view));
        }

        let surface = self.surface.as_ref()?;
        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.resize(self.width, self.height);
                return None;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of memory acquiring the surface");
                return None;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout");
                return None;
            }
            Err(wgpu::SurfaceError::Other) => {
                log::warn!("surface error, frame skipped");
                return None;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Some((Some(output), view))
    }
}

impl FrameBackend for RenderEngine {
    fn begin_frame(&mut self, scene: &Scene) {
        if self.frame.take().is_some() {
            log::warn!("previous frame was never ended, dropped");
        }

        let Some((surface_texture, display_view)) = self.acquire_display() else {
            return;
        };

        self.gpu_scene.sync(
            &self.device,
            &self.queue,
            scene,
            &self.pipelines,
            &self.targets,
        );
        self.set_clear_color(scene.background);

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.frame = Some(FrameInFlight {
            encoder,
            surface_texture,
            display_view,
        });
    }

    fn render_view(
        &mut self,
        destination: Destination,
        view: ViewSource,
        camera: &Camera,
        scene: &Scene,
    ) {
        if self.frame.is_none() {
            return;
        }
        let Some(binding) = self.view_binding(destination) else {
            log::warn!("no render target for {destination:?}");
            return;
        };
        update_uniform(
            &self.queue,
            &binding.buffer,
            &ViewUniforms::new(camera, &scene.lighting),
        );
        let bind_group = binding.bind_group.clone();

        let Some(frame) = self.frame.as_mut() else {
            return;
        };
        let (color_view, depth_view, to_display, written_slot) = match destination {
            Destination::Target(slot) => {
                match (self.targets.get(slot), self.targets.depth_view()) {
                    (Some(target), Some(depth)) => (&target.view, depth, false, Some(slot)),
                    _ => return,
                }
            }
            Destination::Display => (&frame.display_view, &self.depth_view, true, None),
        };

        let label = format!("{view:?} -> {destination:?}");
        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(self.pipelines.pipeline(to_display));
        pass.set_bind_group(0, &bind_group, &[]);

        for object in self.gpu_scene.objects() {
            // A target cannot be sampled in the pass that writes it
            if written_slot.is_some() && object.sampled_slot == written_slot {
                continue;
            }
            let Some(mesh) = &object.mesh else {
                continue;
            };
            pass.set_bind_group(1, &object.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        if let Some(output) = frame.surface_texture {
            output.present();
        }
    }
}
