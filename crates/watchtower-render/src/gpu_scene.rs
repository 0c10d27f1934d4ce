//! GPU mirror of a [`Scene`].
//!
//! The scene is append-only, so syncing only ever creates resources for new
//! objects and textures, rebuilds bind groups whose material revision changed,
//! and rewrites per-object uniforms.

use glam::Vec3;
use watchtower_core::{MaterialSource, Scene, SceneObject, TextureData};

use crate::buffer::{
    create_index_buffer, create_uniform_buffer, create_vertex_buffer, update_uniform,
};
use crate::engine::pipelines::ScenePipelines;
use crate::engine::ObjectUniforms;
use crate::render_target::RenderTargetPool;

/// Uploaded geometry.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// GPU resources of one scene object.
pub struct GpuObject {
    /// None for empty meshes.
    pub mesh: Option<GpuMesh>,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    /// Render target slot sampled by the material, if any.
    pub sampled_slot: Option<usize>,
    revision: u64,
}

/// GPU copies of every scene object and texture.
#[derive(Default)]
pub struct GpuScene {
    objects: Vec<GpuObject>,
    textures: Vec<wgpu::TextureView>,
}

impl GpuScene {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the uploaded objects in scene order.
    pub fn objects(&self) -> &[GpuObject] {
        &self.objects
    }

    /// Brings the mirror up to date with `scene`.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        pipelines: &ScenePipelines,
        targets: &RenderTargetPool,
    ) {
        for texture in scene.textures().iter().skip(self.textures.len()) {
            self.textures.push(upload_texture(device, queue, texture));
        }

        for (index, object) in scene.objects().iter().enumerate() {
            let uniforms = ObjectUniforms::new(object);
            if let Some(gpu) = self.objects.get_mut(index) {
                update_uniform(queue, &gpu.uniform_buffer, &uniforms);
                if gpu.revision != object.revision() {
                    gpu.bind_group = create_bind_group(
                        device,
                        object,
                        &gpu.uniform_buffer,
                        &self.textures,
                        pipelines,
                        targets,
                    );
                    gpu.sampled_slot = object.material().sampled_slot();
                    gpu.revision = object.revision();
                }
                continue;
            }

            let uniform_buffer = create_uniform_buffer(
                device,
                &uniforms,
                Some(&format!("{} uniforms", object.name)),
            );
            let bind_group = create_bind_group(
                device,
                object,
                &uniform_buffer,
                &self.textures,
                pipelines,
                targets,
            );
            let mesh = (!object.mesh.is_empty()).then(|| GpuMesh {
                vertex_buffer: create_vertex_buffer(
                    device,
                    &object.mesh.vertices,
                    Some(&format!("{} vertices", object.name)),
                ),
                index_buffer: create_index_buffer(
                    device,
                    &object.mesh.indices,
                    Some(&format!("{} indices", object.name)),
                ),
                index_count: object.mesh.indices.len() as u32,
            });
            log::debug!(
                "uploaded '{}' ({} triangles)",
                object.name,
                object.mesh.triangle_count()
            );
            self.objects.push(GpuObject {
                mesh,
                uniform_buffer,
                bind_group,
                sampled_slot: object.material().sampled_slot(),
                revision: object.revision(),
            });
        }
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    object: &SceneObject,
    uniform_buffer: &wgpu::Buffer,
    textures: &[wgpu::TextureView],
    pipelines: &ScenePipelines,
    targets: &RenderTargetPool,
) -> wgpu::BindGroup {
    let view = match object.material().source {
        MaterialSource::Color => None,
        MaterialSource::Texture(id) => textures.get(id.0),
        MaterialSource::RenderTarget(slot) => targets.get(slot).map(|t| &t.view),
    }
    .unwrap_or(&pipelines.white_view);

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} bind group", object.name)),
        layout: &pipelines.object_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
            },
        ],
    })
}

impl ObjectUniforms {
    /// Builds the uniforms of `object`.
    pub fn new(object: &SceneObject) -> Self {
        let model = object.transform.matrix();
        let normal_matrix = model.inverse().transpose();
        let material = object.material();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: srgb_to_linear(material.color).extend(1.0).to_array(),
            flags: [if material.unlit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Converts an sRGB-encoded colour to linear.
pub fn srgb_to_linear(color: Vec3) -> Vec3 {
    let channel = |c: f32| {
        if c <= 0.040_45 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(color.x), channel(color.y), channel(color.z))
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: data.width.max(1),
        height: data.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&data.label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let expected = size.width as usize * size.height as usize * 4;
    if data.rgba.len() == expected {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            size,
        );
        log::info!("uploaded texture '{}' ({}x{})", data.label, size.width, size.height);
    } else {
        log::warn!(
            "texture '{}' has {} bytes, expected {expected}; left blank",
            data.label,
            data.rgba.len()
        );
    }

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use watchtower_core::{mesh, Material, Transform};

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(Vec3::ZERO), Vec3::ZERO);
        assert!((srgb_to_linear(Vec3::ONE) - Vec3::ONE).length() < 1e-6);
        let mid = srgb_to_linear(Vec3::splat(0.5));
        assert!((mid.x - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_object_uniforms() {
        let object = SceneObject::new(
            "box",
            Arc::new(mesh::cuboid(1.0, 1.0, 1.0)),
            Material::unlit(Vec3::new(1.0, 0.0, 0.0)),
        )
        .with_transform(Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        let uniforms = ObjectUniforms::new(&object);
        assert_eq!(uniforms.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniforms.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniforms.flags[0], 1.0);
    }
}
