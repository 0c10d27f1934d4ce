//! The render target pool: one offscreen colour texture per slot.
//!
//! Targets are allocated once at startup and never resized. All slots have the
//! same size and share a single depth buffer since their passes never overlap.

use watchtower_core::{SlotDescriptor, TargetSize};

use crate::error::{RenderError, RenderResult};

/// Colour format of every render target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Depth format shared by every pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// An offscreen colour buffer owned by one slot.
pub struct RenderTarget {
    /// Slot index.
    pub slot: usize,
    /// Pixel size.
    pub size: TargetSize,
    /// The colour texture.
    pub texture: wgpu::Texture,
    /// View used both as attachment and as sampled texture.
    pub view: wgpu::TextureView,
}

/// All render targets plus their shared depth buffer.
pub struct RenderTargetPool {
    targets: Vec<RenderTarget>,
    depth_texture: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,
}

impl RenderTargetPool {
    /// Allocates one target per slot.
    ///
    /// Fails if a target exceeds the device's texture limit or the device runs
    /// out of memory. Nothing is retried.
    pub fn allocate(device: &wgpu::Device, slots: &[SlotDescriptor]) -> RenderResult<Self> {
        let max_dimension = device.limits().max_texture_dimension_2d;
        for slot in slots {
            check_limits(slot, max_dimension)?;
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let targets: Vec<RenderTarget> = slots
            .iter()
            .map(|slot| {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(&format!("render target {}", slot.index)),
                    size: extent(slot.size),
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: TARGET_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                RenderTarget {
                    slot: slot.index,
                    size: slot.size,
                    texture,
                    view,
                }
            })
            .collect();

        // Slots are planned from one surface size, so one depth buffer fits all
        let depth_texture = slots.first().map(|slot| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("render target depth"),
                size: extent(slot.size),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = out_of_memory.or(validation) {
            let first = slots.first().map_or(TargetSize { width: 0, height: 0 }, |s| s.size);
            return Err(RenderError::TargetAllocationFailed {
                slot: 0,
                width: first.width,
                height: first.height,
                reason: err.to_string(),
            });
        }

        for target in &targets {
            log::info!(
                "allocated render target {} ({}x{}, {} KiB)",
                target.slot,
                target.size.width,
                target.size.height,
                target.size.rgba_bytes() / 1024
            );
        }

        let depth_view = depth_texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));
        Ok(Self {
            targets,
            depth_texture,
            depth_view,
        })
    }

    /// Returns the target of `slot`.
    pub fn get(&self, slot: usize) -> Option<&RenderTarget> {
        self.targets.get(slot)
    }

    /// Returns every target.
    pub fn targets(&self) -> &[RenderTarget] {
        &self.targets
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the shared depth view.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth_view.as_ref()
    }

    /// Returns the shared depth texture size.
    pub fn depth_size(&self) -> Option<wgpu::Extent3d> {
        self.depth_texture.as_ref().map(wgpu::Texture::size)
    }
}

fn extent(size: TargetSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

fn check_limits(slot: &SlotDescriptor, max_dimension: u32) -> RenderResult<()> {
    if slot.size.width > max_dimension || slot.size.height > max_dimension {
        return Err(RenderError::TargetAllocationFailed {
            slot: slot.index,
            width: slot.size.width,
            height: slot.size.height,
            reason: format!("exceeds the device limit of {max_dimension} pixels"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchtower_core::SlotCamera;

    fn slot(width: u32, height: u32) -> SlotDescriptor {
        SlotDescriptor {
            index: 2,
            camera: SlotCamera::Fixed(0),
            size: TargetSize { width, height },
        }
    }

    #[test]
    fn test_limit_check() {
        assert!(check_limits(&slot(3072, 3584), 8192).is_ok());
        let err = check_limits(&slot(3072, 3584), 2048).unwrap_err();
        assert!(matches!(err, RenderError::TargetAllocationFailed { slot: 2, .. }));
    }
}
