//! Damped orbit control for the primary camera.
//!
//! Input methods only accumulate pending motion. [`OrbitControls::update`]
//! applies a damped fraction of it, then clamps the resulting distance and
//! polar angle, so no input sequence can leave the camera outside its limits.

use std::f32::consts::PI;

use glam::Vec3;

use crate::camera::Camera;
use crate::config::OrbitSettings;

/// Smallest polar angle kept away from the poles.
const POLE_EPSILON: f32 = 1e-6;

/// Spherical coordinates relative to the pivot, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    /// Distance from the pivot.
    pub radius: f32,
    /// Angle from the +Y axis.
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub theta: f32,
}

impl Spherical {
    /// Converts an offset vector to spherical coordinates.
    #[must_use]
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    /// Converts back to an offset vector.
    #[must_use]
    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit control state for one camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    settings: OrbitSettings,
    pivot: Vec3,
    spherical: Spherical,
    // Pending motion, decayed by the damping factor on every update
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    /// Creates controls for a camera orbiting `pivot` from `position`.
    ///
    /// The starting pose is clamped immediately.
    #[must_use]
    pub fn new(settings: OrbitSettings, pivot: Vec3, position: Vec3) -> Self {
        let mut controls = Self {
            settings,
            pivot,
            spherical: Spherical::from_offset(position - pivot),
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        };
        controls.clamp();
        controls
    }

    /// Returns the control settings.
    #[must_use]
    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// Returns the orbit pivot.
    #[must_use]
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Returns the current distance from the pivot.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Returns the current polar angle (from the up axis).
    #[must_use]
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Returns the current azimuth.
    #[must_use]
    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    /// Returns the camera position implied by the current state.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.pivot + self.spherical.to_offset()
    }

    /// Queues a rotation around the up axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Queues a rotation towards the up axis.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Queues a rotation from a pointer drag, in pixels.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let speed = 2.0 * PI * self.settings.rotate_speed / viewport_height;
        self.rotate_left(dx * speed);
        self.rotate_up(dy * speed);
    }

    /// Queues a zoom step. Positive steps move closer to the pivot.
    pub fn zoom(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(self.settings.zoom_speed);
        self.scale *= factor.powf(steps);
    }

    /// Queues a pan from a pointer drag, in pixels.
    pub fn pan_by_pixels(&mut self, camera: &Camera, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        // Scale so the pivot plane moves with the pointer
        let visible_height = 2.0 * self.spherical.radius * (camera.fov * 0.5).tan();
        let units_per_pixel = visible_height / viewport_height * self.settings.pan_speed;
        let right = camera.right();
        let up = right.cross(camera.forward()).normalize();
        self.pan_offset += -right * dx * units_per_pixel + up * dy * units_per_pixel;
    }

    /// Applies one damped update step and writes the pose into `camera`.
    ///
    /// Returns true if the camera moved noticeably.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = self.position();
        let damping = self.settings.damping_factor;

        self.spherical.theta += self.delta_theta * damping;
        self.spherical.phi += self.delta_phi * damping;
        self.spherical.radius *= self.scale;
        self.pivot += self.pan_offset * damping;
        self.clamp();

        self.delta_theta *= 1.0 - damping;
        self.delta_phi *= 1.0 - damping;
        self.pan_offset *= 1.0 - damping;
        self.scale = 1.0;

        let position = self.position();
        camera.look_at(position, self.pivot);
        position.distance_squared(before) > 1e-12
    }

    fn clamp(&mut self) {
        let s = &self.settings;
        let min_phi = s.min_polar_angle.max(POLE_EPSILON);
        let max_phi = s.max_polar_angle.min(PI - POLE_EPSILON);
        self.spherical.phi = self.spherical.phi.clamp(min_phi, max_phi);
        self.spherical.radius = self.spherical.radius.clamp(s.min_distance, s.max_distance);
        self.spherical.theta = self.spherical.theta.rem_euclid(2.0 * PI);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controls() -> OrbitControls {
        OrbitControls::new(
            OrbitSettings::default(),
            Vec3::ZERO,
            Vec3::new(-16.0, 8.0, 16.0),
        )
    }

    fn in_bounds(c: &OrbitControls) -> bool {
        let s = c.settings();
        let eps = 1e-4;
        c.distance() >= s.min_distance - eps
            && c.distance() <= s.max_distance + eps
            && c.polar_angle() >= s.min_polar_angle - eps
            && c.polar_angle() <= s.max_polar_angle + eps
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(-16.0, 8.0, 16.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-4);
    }

    #[test]
    fn test_initial_pose_preserved_when_in_bounds() {
        let c = controls();
        assert!((c.distance() - 24.0).abs() < 1e-4);
        assert!((c.position() - Vec3::new(-16.0, 8.0, 16.0)).length() < 1e-3);
    }

    #[test]
    fn test_initial_pose_clamped() {
        let c = OrbitControls::new(OrbitSettings::default(), Vec3::ZERO, Vec3::new(0.0, 100.0, 0.1));
        assert!(in_bounds(&c));
    }

    #[test]
    fn test_damping_converges() {
        let mut c = controls();
        let mut camera = Camera::default();
        c.rotate_left(0.5);
        let start = c.azimuth();
        c.update(&mut camera);
        let first_step = (c.azimuth() - start).abs();
        assert!((first_step - 0.5 * 0.05).abs() < 1e-4);

        for _ in 0..2000 {
            c.update(&mut camera);
        }
        // Total rotation converges to the requested angle
        let total = (start - c.azimuth()).rem_euclid(2.0 * PI);
        assert!((total - 0.5).abs() < 1e-3, "total rotation {total}");
        assert!(!c.update(&mut camera));
    }

    #[test]
    fn test_update_points_camera_at_pivot() {
        let mut c = controls();
        let mut camera = Camera::default();
        c.update(&mut camera);
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.position - c.position()).length() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut c = controls();
        let mut camera = Camera::default();
        c.zoom(1000.0);
        c.update(&mut camera);
        assert!((c.distance() - 5.0).abs() < 1e-4);
        c.zoom(-1000.0);
        c.update(&mut camera);
        assert!((c.distance() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_cannot_look_from_overhead() {
        let mut c = controls();
        let mut camera = Camera::default();
        c.rotate_up(100.0);
        for _ in 0..500 {
            c.update(&mut camera);
            assert!(in_bounds(&c));
        }
        assert!((c.polar_angle() - c.settings().min_polar_angle).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_pivot() {
        let mut c = controls();
        let mut camera = Camera::default();
        c.update(&mut camera);
        c.pan_by_pixels(&camera, 100.0, 0.0, 720.0);
        for _ in 0..500 {
            c.update(&mut camera);
        }
        assert!(c.pivot().length() > 0.1);
        assert!(in_bounds(&c));
    }

    #[derive(Debug, Clone)]
    enum Input {
        Rotate(f32, f32),
        Zoom(f32),
        Pan(f32, f32),
        Update,
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            (-2000.0f32..2000.0, -2000.0f32..2000.0).prop_map(|(x, y)| Input::Rotate(x, y)),
            (-50.0f32..50.0).prop_map(Input::Zoom),
            (-500.0f32..500.0, -500.0f32..500.0).prop_map(|(x, y)| Input::Pan(x, y)),
            Just(Input::Update),
        ]
    }

    proptest! {
        #[test]
        fn prop_clamped_after_every_update(inputs in prop::collection::vec(input(), 1..200)) {
            let mut c = controls();
            let mut camera = Camera::default();
            c.update(&mut camera);
            for input in inputs {
                match input {
                    Input::Rotate(dx, dy) => c.rotate_by_pixels(dx, dy, 720.0),
                    Input::Zoom(steps) => c.zoom(steps),
                    Input::Pan(dx, dy) => c.pan_by_pixels(&camera, dx, dy, 720.0),
                    Input::Update => {}
                }
                c.update(&mut camera);
                prop_assert!(in_bounds(&c));
                let offset = camera.position - camera.target;
                prop_assert!((offset.length() - c.distance()).abs() < 1e-2 * c.distance().max(1.0));
            }
        }
    }
}
