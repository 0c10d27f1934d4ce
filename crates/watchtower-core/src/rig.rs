//! The camera rig: one interactive primary camera plus fixed secondary cameras.

use glam::Vec3;

use crate::camera::Camera;
use crate::config::Config;
use crate::orbit::OrbitControls;

/// A fixed camera mounted on a fixture.
#[derive(Debug, Clone)]
pub struct SecondaryCamera {
    /// Label used in logs.
    pub label: String,
    /// The camera. Posed once at construction.
    pub camera: Camera,
}

/// Owns every camera in the scene.
#[derive(Debug, Clone)]
pub struct CameraRig {
    primary: Camera,
    controls: OrbitControls,
    secondaries: Vec<SecondaryCamera>,
    viewport: (u32, u32),
}

impl CameraRig {
    /// Builds the rig for a viewport of `width` x `height` pixels.
    #[must_use]
    pub fn new(config: &Config, width: u32, height: u32) -> Self {
        let mut primary = Camera::new(&config.camera, aspect(width, height));
        let mut controls =
            OrbitControls::new(config.primary.orbit, config.primary.pivot, config.primary.position);
        controls.update(&mut primary);

        let surface_aspect = config.render_targets.surface_aspect();
        let secondaries = config
            .fixtures
            .iter()
            .map(|fixture| {
                let mut camera = Camera::new(&config.camera, surface_aspect);
                let position = fixture.base + Vec3::Y * config.fixture_camera_offset;
                camera.look_at(position, fixture.look_at);
                SecondaryCamera {
                    label: fixture.label.clone(),
                    camera,
                }
            })
            .collect();

        Self {
            primary,
            controls,
            secondaries,
            viewport: (width.max(1), height.max(1)),
        }
    }

    /// Returns the primary camera.
    #[must_use]
    pub fn primary(&self) -> &Camera {
        &self.primary
    }

    /// Returns the primary camera's orbit controls.
    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Returns the orbit controls and the camera they drive.
    pub fn controls_mut(&mut self) -> (&mut OrbitControls, &Camera) {
        (&mut self.controls, &self.primary)
    }

    /// Applies one damping step to the primary camera.
    pub fn update_controls(&mut self) -> bool {
        self.controls.update(&mut self.primary)
    }

    /// Returns the secondary camera at `index`.
    #[must_use]
    pub fn secondary(&self, index: usize) -> Option<&SecondaryCamera> {
        self.secondaries.get(index)
    }

    /// Returns all secondary cameras in cycle order.
    #[must_use]
    pub fn secondaries(&self) -> &[SecondaryCamera] {
        &self.secondaries
    }

    /// Returns the number of secondary cameras.
    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.secondaries.len()
    }

    /// Returns the viewport size in pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Updates the viewport. Only the primary camera's aspect ratio changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.primary.set_aspect_ratio(aspect(width, height));
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
