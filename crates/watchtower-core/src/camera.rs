//! Perspective cameras.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::CameraSettings;

/// A perspective camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a camera at the origin looking down -Z.
    #[must_use]
    pub fn new(settings: &CameraSettings, aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: settings.fov_degrees.to_radians(),
            aspect_ratio,
            near: settings.near,
            far: settings.far,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Moves the camera and points it at `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix (wgpu depth range [0, 1]).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Projects a world-space point to pixel coordinates (origin top-left).
    ///
    /// Returns `None` for points behind the camera.
    #[must_use]
    pub fn world_to_screen(&self, point: Vec3, width: u32, height: u32) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        ))
    }

    /// Unprojects a normalized device coordinate to a world-space ray
    /// `(origin, direction)` starting on the near plane.
    #[must_use]
    pub fn ndc_ray(&self, ndc: Vec2) -> Option<(Vec3, Vec3)> {
        let inv_view_proj = self.view_projection_matrix().inverse();

        let near = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
            return None;
        }

        let origin = near.truncate() / near.w;
        let ray_far = far.truncate() / far.w;
        let direction = (ray_far - origin).normalize_or_zero();
        if direction.length_squared() < 1e-12 {
            return None;
        }

        Some((origin, direction))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraSettings::default(), 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_from_settings() {
        let camera = Camera::new(&CameraSettings::default(), 1.5);
        assert!((camera.fov - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 500.0);
        assert_eq!(camera.aspect_ratio, 1.5);
    }

    #[test]
    fn test_look_at_forward() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_world_to_screen_center() {
        let mut camera = Camera::new(&CameraSettings::default(), 800.0 / 600.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let p = camera.world_to_screen(Vec3::ZERO, 800, 600).unwrap();
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);

        // Points above the target land in the upper half of the image
        let above = camera.world_to_screen(Vec3::Y, 800, 600).unwrap();
        assert!(above.y < 300.0);
    }

    #[test]
    fn test_world_to_screen_behind() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(camera
            .world_to_screen(Vec3::new(0.0, 0.0, 20.0), 100, 100)
            .is_none());
    }

    #[test]
    fn test_ndc_ray_through_center() {
        let mut camera = Camera::default();
        camera.look_at(Vec3::new(0.0, 2.0, 10.0), Vec3::new(0.0, 2.0, 0.0));
        let (origin, dir) = camera.ndc_ray(Vec2::ZERO).unwrap();
        assert!((dir - Vec3::NEG_Z).length() < 1e-4);
        assert!((origin.z - (10.0 - camera.near)).abs() < 1e-3);
    }
}
