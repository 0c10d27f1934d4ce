//! Pointer events and view rays.

use glam::{Vec2, Vec3};

use crate::camera::Camera;

/// A pointer-down event in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Horizontal pixel position, from the left edge.
    pub x: f32,
    /// Vertical pixel position, from the top edge.
    pub y: f32,
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
}

impl PointerEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(x: f32, y: f32, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            x,
            y,
            viewport_width,
            viewport_height,
        }
    }

    /// Normalized device coordinates in [-1, 1] x [-1, 1], Y up.
    ///
    /// Returns `None` for an empty viewport.
    #[must_use]
    pub fn ndc(&self) -> Option<Vec2> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return None;
        }
        Some(Vec2::new(
            (self.x / self.viewport_width as f32) * 2.0 - 1.0,
            -(self.y / self.viewport_height as f32) * 2.0 + 1.0,
        ))
    }
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Casts a ray from `camera` through a normalized device coordinate.
    #[must_use]
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Option<Self> {
        camera
            .ndc_ray(ndc)
            .map(|(origin, direction)| Self { origin, direction })
    }

    /// Returns the point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
