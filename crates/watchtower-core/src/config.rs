//! Configuration for the watchtower scene.
//!
//! Every tunable constant of the viewer lives here so it can be reviewed and
//! tested without a render loop. All sections fall back to their defaults when
//! omitted from a JSON file.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchtowerError};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Projection parameters shared by every camera.
    pub camera: CameraSettings,
    /// Primary (interactive) camera.
    pub primary: PrimaryCameraConfig,
    /// Camera fixtures, one per secondary camera, in cycle order.
    pub fixtures: Vec<FixtureConfig>,
    /// Vertical distance from a fixture's pole base to its camera.
    pub fixture_camera_offset: f32,
    /// Offscreen render targets.
    pub render_targets: RenderTargetConfig,
    /// In-world screens displaying render targets.
    pub screens: Vec<ScreenConfig>,
    /// Continuous scene animation.
    pub animation: AnimationConfig,
    /// Static scene content.
    pub scene: SceneConfig,
}

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "watchtower".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// Primary camera placement and orbit limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryCameraConfig {
    /// Initial camera position.
    pub position: Vec3,
    /// Point the camera orbits around.
    pub pivot: Vec3,
    /// Orbit control settings.
    pub orbit: OrbitSettings,
}

impl Default for PrimaryCameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(-16.0, 8.0, 16.0),
            pivot: Vec3::ZERO,
            orbit: OrbitSettings::default(),
        }
    }
}

/// Orbit control limits and response.
///
/// Polar angles are measured from the up axis in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Fraction of the pending motion applied per update, in (0, 1].
    pub damping_factor: f32,
    /// Minimum distance from the pivot.
    pub min_distance: f32,
    /// Maximum distance from the pivot.
    pub max_distance: f32,
    /// Minimum polar angle.
    pub min_polar_angle: f32,
    /// Maximum polar angle.
    pub max_polar_angle: f32,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 5.0,
            max_distance: 60.0,
            min_polar_angle: FRAC_PI_4,
            max_polar_angle: FRAC_PI_2 - 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

/// A pole-mounted camera fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Human-readable label used in logs.
    pub label: String,
    /// Centre of the fixture's pole.
    pub base: Vec3,
    /// Point the mounted camera looks at.
    pub look_at: Vec3,
    /// Colour of the pole and camera housing.
    pub color: Vec3,
}

/// Which camera a render target slot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCamera {
    /// Follows the selection state.
    Active,
    /// Always shows the secondary camera with this index.
    Fixed(usize),
}

/// Render target pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTargetConfig {
    /// Texels per world unit of surface size.
    pub texel_density: u32,
    /// Width of the surfaces displaying the targets, in world units.
    pub surface_width: f32,
    /// Height of the surfaces displaying the targets, in world units.
    pub surface_height: f32,
    /// One entry per render target slot.
    pub slots: Vec<SlotCamera>,
}

impl Default for RenderTargetConfig {
    fn default() -> Self {
        Self {
            texel_density: 512,
            surface_width: 6.0,
            surface_height: 7.0,
            slots: vec![SlotCamera::Active, SlotCamera::Fixed(2), SlotCamera::Fixed(1)],
        }
    }
}

impl RenderTargetConfig {
    /// Aspect ratio (width / height) of the target surfaces.
    #[must_use]
    pub fn surface_aspect(&self) -> f32 {
        self.surface_width / self.surface_height
    }
}

/// A screen quad displaying one render target slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Slot whose render target is displayed.
    pub slot: usize,
    /// Centre of the screen quad.
    pub position: Vec3,
    /// Whether clicking the screen cycles the active camera.
    pub pickable: bool,
}

/// Continuous animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Rotation applied to the animated object each frame, in radians.
    pub rotation_increment: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_increment: 0.05,
        }
    }
}

/// Directional plus ambient lighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Position the directional light shines from, towards the origin.
    pub position: Vec3,
    /// Directional light intensity.
    pub intensity: f32,
    /// Ambient light intensity.
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 10.0, -4.0),
            intensity: 1.0,
            ambient: 0.5,
        }
    }
}

/// A model loaded after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to a glTF or GLB file.
    pub path: PathBuf,
    /// World position of the model root.
    pub position: Vec3,
    /// Rotation about the up axis in degrees.
    pub yaw_degrees: f32,
    /// Uniform scale.
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model.glb"),
            position: Vec3::new(0.0, 0.0, 6.0),
            yaw_degrees: 90.0,
            scale: 1.0,
        }
    }
}

/// Static scene content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Clear colour of every pass.
    pub background: Vec3,
    /// Side length of the square ground plane.
    pub ground_size: f32,
    /// Texture for the ground; required before the first frame when set.
    pub ground_texture: Option<PathBuf>,
    /// Model streamed in after the loop has started.
    pub model: Option<ModelConfig>,
    /// Lighting.
    pub light: LightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: hex_color(0x00a8_def0),
            ground_size: 20.0,
            ground_texture: None,
            model: None,
            light: LightConfig::default(),
        }
    }
}

/// Converts a `0xRRGGBB` colour into sRGB components in [0, 1].
#[must_use]
pub fn hex_color(hex: u32) -> Vec3 {
    let r = (hex >> 16) & 0xff;
    let g = (hex >> 8) & 0xff;
    let b = hex & 0xff;
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraSettings::default(),
            primary: PrimaryCameraConfig::default(),
            fixtures: vec![
                FixtureConfig {
                    label: "north-east pole".to_string(),
                    base: Vec3::new(5.0, 1.5, -5.0),
                    look_at: Vec3::new(0.0, 1.0, 0.0),
                    color: hex_color(0x00ff_8800),
                },
                FixtureConfig {
                    label: "west pole".to_string(),
                    base: Vec3::new(-5.0, 1.5, 8.0),
                    look_at: Vec3::new(5.0, 3.0, 6.0),
                    color: hex_color(0x000f_ff88),
                },
                FixtureConfig {
                    label: "front-right pole".to_string(),
                    base: Vec3::new(5.0, 1.5, 6.0),
                    look_at: Vec3::new(-5.0, 3.0, 8.0),
                    color: Vec3::ZERO,
                },
            ],
            fixture_camera_offset: 1.7,
            render_targets: RenderTargetConfig::default(),
            screens: vec![ScreenConfig {
                slot: 0,
                position: Vec3::new(0.0, 5.0, -8.0),
                pickable: true,
            }],
            animation: AnimationConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl Config {
    /// Parses and validates a configuration from JSON. Missing fields take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("loaded configuration from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(WatchtowerError::InvalidConfig(msg));

        let targets = &self.render_targets;
        if targets.texel_density == 0 {
            return invalid("texel density must be positive".into());
        }
        if !(targets.surface_width > 0.0 && targets.surface_height > 0.0) {
            return invalid(format!(
                "surface size must be positive, got {}x{}",
                targets.surface_width, targets.surface_height
            ));
        }
        if self.fixtures.is_empty() {
            return invalid("at least one camera fixture is required".into());
        }
        let active_slots = targets
            .slots
            .iter()
            .filter(|slot| **slot == SlotCamera::Active)
            .count();
        if active_slots != 1 {
            return invalid(format!(
                "exactly one active render target slot is required, found {active_slots}"
            ));
        }
        for (slot, camera) in targets.slots.iter().enumerate() {
            if let SlotCamera::Fixed(index) = camera {
                if *index >= self.fixtures.len() {
                    return invalid(format!(
                        "slot {slot} names camera {index}, but only {} exist",
                        self.fixtures.len()
                    ));
                }
            }
        }
        for fixture in &self.fixtures {
            let eye = fixture.base + Vec3::Y * self.fixture_camera_offset;
            let view = fixture.look_at - eye;
            // Zero or vertical view directions have no look-at basis
            let off_axis = view.cross(Vec3::Y).length_squared();
            if !view.is_finite() || off_axis <= 1e-8 * view.length_squared() {
                return invalid(format!(
                    "fixture '{}' must look at a point off its vertical axis",
                    fixture.label
                ));
            }
        }
        for screen in &self.screens {
            if screen.slot >= targets.slots.len() {
                return invalid(format!("screen shows missing slot {}", screen.slot));
            }
        }

        let orbit = &self.primary.orbit;
        if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
            return invalid(format!(
                "damping factor must be in (0, 1], got {}",
                orbit.damping_factor
            ));
        }
        if !(orbit.min_distance > 0.0 && orbit.min_distance <= orbit.max_distance) {
            return invalid(format!(
                "invalid orbit distance range [{}, {}]",
                orbit.min_distance, orbit.max_distance
            ));
        }
        if !(orbit.min_polar_angle >= 0.0
            && orbit.min_polar_angle <= orbit.max_polar_angle
            && orbit.max_polar_angle <= std::f32::consts::PI)
        {
            return invalid(format!(
                "invalid polar angle range [{}, {}]",
                orbit.min_polar_angle, orbit.max_polar_angle
            ));
        }

        if !self.animation.rotation_increment.is_finite() {
            return invalid(format!(
                "rotation increment must be finite, got {}",
                self.animation.rotation_increment
            ));
        }

        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return invalid(format!(
                "invalid clip range [{}, {}]",
                camera.near, camera.far
            ));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return invalid(format!("invalid field of view {}", camera.fov_degrees));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fixtures.len(), 3);
        assert_eq!(config.render_targets.slots.len(), 3);
        assert_eq!(config.render_targets.texel_density, 512);
    }

    #[test]
    fn test_rejects_no_fixtures() {
        let mut config = Config::default();
        config.fixtures.clear();
        config.render_targets.slots = vec![SlotCamera::Active];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_surface_aspect() {
        let targets = RenderTargetConfig::default();
        assert!((targets.surface_aspect() - 6.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_color() {
        let c = hex_color(0x00ff_8000);
        assert_eq!(c, Vec3::new(1.0, 128.0 / 255.0, 0.0));
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = Config::from_json_str(
            r#"{ "camera": { "fov_degrees": 60.0 }, "animation": { "rotation_increment": 0.1 } }"#,
        )
        .unwrap();
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.animation.rotation_increment, 0.1);
        assert_eq!(config.fixtures.len(), 3);
        assert_eq!(config.screens.len(), 1);
    }

    #[test]
    fn test_slot_camera_serde() {
        let config = Config::from_json_str(
            r#"{ "render_targets": { "slots": ["active", { "fixed": 0 }] } }"#,
        )
        .unwrap();
        assert_eq!(
            config.render_targets.slots,
            vec![SlotCamera::Active, SlotCamera::Fixed(0)]
        );
    }

    #[test]
    fn test_rejects_two_active_slots() {
        let mut config = Config::default();
        config.render_targets.slots = vec![SlotCamera::Active, SlotCamera::Active];
        assert!(matches!(
            config.validate(),
            Err(WatchtowerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_missing_fixed_camera() {
        let mut config = Config::default();
        config.render_targets.slots = vec![SlotCamera::Active, SlotCamera::Fixed(7)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_polar_range() {
        let mut config = Config::default();
        config.primary.orbit.min_polar_angle = 1.5;
        config.primary.orbit.max_polar_angle = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_damping_outside_unit_range() {
        for damping in [0.0, -0.1, 1.5, f32::NAN] {
            let mut config = Config::default();
            config.primary.orbit.damping_factor = damping;
            assert!(config.validate().is_err(), "damping {damping} accepted");
        }
        let mut config = Config::default();
        config.primary.orbit.damping_factor = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_screen_on_missing_slot() {
        let mut config = Config::default();
        config.screens[0].slot = 3;
        assert!(matches!(
            config.validate(),
            Err(WatchtowerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_rotation_increment() {
        for increment in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut config = Config::default();
            config.animation.rotation_increment = increment;
            assert!(config.validate().is_err(), "increment {increment} accepted");
        }
    }

    #[test]
    fn test_rejects_fixture_looking_at_itself() {
        let mut config = Config::default();
        let eye = config.fixtures[0].base + Vec3::Y * config.fixture_camera_offset;
        config.fixtures[0].look_at = eye;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_fixture_looking_straight_down() {
        let mut config = Config::default();
        config.fixtures[1].look_at = config.fixtures[1].base - Vec3::Y * 4.0;
        assert!(config.validate().is_err());

        config.fixtures[1].look_at = config.fixtures[1].base + Vec3::Y * 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_density() {
        let mut config = Config::default();
        config.render_targets.texel_density = 0;
        assert!(config.validate().is_err());
    }
}
