//! Render target sizing.

use crate::config::{RenderTargetConfig, SlotCamera};
use crate::error::{Result, WatchtowerError};

/// Pixel dimensions of an offscreen render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TargetSize {
    /// Sizes a target for a surface of `width_units` x `height_units` world units
    /// at `density` texels per unit.
    pub fn for_surface(width_units: f32, height_units: f32, density: u32) -> Result<Self> {
        let to_pixels = |units: f32| -> Option<u32> {
            let pixels = (units * density as f32).round();
            (pixels.is_finite() && pixels >= 1.0 && pixels <= u32::MAX as f32)
                .then_some(pixels as u32)
        };
        match (to_pixels(width_units), to_pixels(height_units)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(WatchtowerError::AllocationFailure {
                label: format!("{width_units}x{height_units} surface"),
                reason: format!("no valid pixel size at density {density}"),
            }),
        }
    }

    /// Number of bytes an RGBA8 image of this size occupies.
    #[must_use]
    pub fn rgba_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Static description of one render target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Slot index.
    pub index: usize,
    /// Camera binding of the slot.
    pub camera: SlotCamera,
    /// Target size.
    pub size: TargetSize,
}

/// Computes the descriptor of every slot in the pool.
pub fn plan_slots(config: &RenderTargetConfig) -> Result<Vec<SlotDescriptor>> {
    let size = TargetSize::for_surface(
        config.surface_width,
        config.surface_height,
        config.texel_density,
    )?;
    Ok(config
        .slots
        .iter()
        .enumerate()
        .map(|(index, camera)| SlotDescriptor {
            index,
            camera: *camera,
            size,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_size() {
        let size = TargetSize::for_surface(6.0, 7.0, 512).unwrap();
        assert_eq!(size, TargetSize { width: 3072, height: 3584 });
    }

    #[test]
    fn test_fractional_surface() {
        let size = TargetSize::for_surface(0.25, 0.5, 512).unwrap();
        assert_eq!(size, TargetSize { width: 128, height: 256 });
    }

    #[test]
    fn test_degenerate_surface_fails() {
        assert!(matches!(
            TargetSize::for_surface(0.0, 7.0, 512),
            Err(WatchtowerError::AllocationFailure { .. })
        ));
        assert!(TargetSize::for_surface(f32::NAN, 1.0, 512).is_err());
        assert!(TargetSize::for_surface(f32::INFINITY, 1.0, 512).is_err());
    }

    #[test]
    fn test_plan_slots() {
        let slots = plan_slots(&RenderTargetConfig::default()).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].camera, SlotCamera::Active);
        assert_eq!(slots[1].camera, SlotCamera::Fixed(2));
        assert_eq!(slots[2].camera, SlotCamera::Fixed(1));
        assert!(slots.iter().all(|s| s.size.width == 3072 && s.size.height == 3584));
    }
}
