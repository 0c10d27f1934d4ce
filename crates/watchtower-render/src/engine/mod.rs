//! The main rendering engine.

mod capture;
mod frame;
pub(crate) mod pipelines;

use std::sync::Arc;

use watchtower_core::{Camera, Destination, Lighting, SlotDescriptor};

use crate::buffer::create_uniform_buffer;
use crate::error::{RenderError, RenderResult};
use crate::gpu_scene::{srgb_to_linear, GpuScene};
use crate::render_target::{RenderTargetPool, DEPTH_FORMAT};
use frame::FrameInFlight;
use pipelines::ScenePipelines;

/// Per-destination view uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// xyz: unit direction towards the light, w: intensity.
    pub light: [f32; 4],
    /// x: ambient intensity.
    pub ambient: [f32; 4],
}

impl ViewUniforms {
    /// Builds the uniforms for rendering from `camera` under `lighting`.
    pub fn new(camera: &Camera, lighting: &Lighting) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light: lighting.direction.extend(lighting.intensity).to_array(),
            ambient: [lighting.ambient, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for ViewUniforms {
    fn default() -> Self {
        Self::new(&Camera::default(), &Lighting::default())
    }
}

/// Per-object uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: unlit.
    pub flags: [f32; 4],
}

/// Uniform buffer and bind group for one pass destination.
pub(crate) struct ViewBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// The rendering engine backed by wgpu.
///
/// Implements [`watchtower_core::FrameBackend`]: each frame records every
/// render target pass and the display pass into one command encoder and
/// submits them together.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. Also describes the headless display texture.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Display depth texture view.
    pub(crate) depth_view: wgpu::TextureView,
    /// Offscreen display image (headless only).
    pub(crate) display_texture: Option<wgpu::Texture>,
    /// Render target pool.
    pub(crate) targets: RenderTargetPool,
    /// Pipelines and layouts.
    pub(crate) pipelines: ScenePipelines,
    /// GPU copy of the scene.
    pub(crate) gpu_scene: GpuScene,
    /// One view binding per render target, then one for the display.
    pub(crate) view_bindings: Vec<ViewBinding>,
    /// Frame being recorded.
    pub(crate) frame: Option<FrameInFlight>,
    /// Clear colour of the current frame, linear.
    pub(crate) clear_color: wgpu::Color,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
}

impl RenderEngine {
    /// Creates a windowed render engine with one render target per slot.
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        slots: &[SlotDescriptor],
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = request_device(&adapter, "watchtower device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "windowed engine on {} ({width}x{height}, {surface_format:?})",
            adapter.get_info().name
        );

        Self::assemble(instance, adapter, device, queue, Some(surface), surface_config, slots)
    }

    /// Creates a headless render engine drawing into an offscreen display image.
    pub async fn new_headless(
        width: u32,
        height: u32,
        slots: &[SlotDescriptor],
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = request_device(&adapter, "watchtower device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        log::info!(
            "headless engine on {} ({}x{})",
            adapter.get_info().name,
            surface_config.width,
            surface_config.height
        );

        let mut engine =
            Self::assemble(instance, adapter, device, queue, None, surface_config, slots)?;
        engine.display_texture = Some(engine.create_display_texture());
        Ok(engine)
    }

    fn assemble(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: wgpu::SurfaceConfiguration,
        slots: &[SlotDescriptor],
    ) -> RenderResult<Self> {
        let targets = RenderTargetPool::allocate(&device, slots)?;
        let pipelines = ScenePipelines::new(&device, &queue, surface_config.format);

        let view_bindings = (0..=targets.len())
            .map(|i| {
                let buffer = create_uniform_buffer(
                    &device,
                    &ViewUniforms::default(),
                    Some(&format!("view uniforms {i}")),
                );
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("view bind group {i}")),
                    layout: &pipelines.view_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                ViewBinding { buffer, bind_group }
            })
            .collect();

        let depth_view =
            Self::create_depth_view(&device, surface_config.width, surface_config.height);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            width: surface_config.width,
            height: surface_config.height,
            surface_config,
            depth_view,
            display_texture: None,
            targets,
            pipelines,
            gpu_scene: GpuScene::new(),
            view_bindings,
            frame: None,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Resizes the display.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
        if self.display_texture.is_some() {
            self.display_texture = Some(self.create_display_texture());
        }

        self.depth_view = Self::create_depth_view(&self.device, width, height);
    }

    /// Returns the current viewport dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the render target pool.
    pub fn targets(&self) -> &RenderTargetPool {
        &self.targets
    }

    pub(crate) fn view_binding(&self, destination: Destination) -> Option<&ViewBinding> {
        match destination {
            Destination::Target(slot) if slot < self.targets.len() => self.view_bindings.get(slot),
            Destination::Target(_) => None,
            Destination::Display => self.view_bindings.last(),
        }
    }

    pub(crate) fn set_clear_color(&mut self, background: glam::Vec3) {
        let linear = srgb_to_linear(background);
        self.clear_color = wgpu::Color {
            r: f64::from(linear.x),
            g: f64::from(linear.y),
            b: f64::from(linear.z),
            a: 1.0,
        };
    }

    fn create_display_texture(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("headless display"),
            size: wgpu::Extent3d {
                width: self.surface_config.width,
                height: self.surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_config.format,
            usage: self.surface_config.usage,
            view_formats: &[],
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

async fn request_device(
    adapter: &wgpu::Adapter,
    label: &str,
) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
        })
        .await?;
    Ok((device, queue))
}
