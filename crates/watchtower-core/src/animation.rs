//! Continuous per-frame scene animation.

use std::f64::consts::TAU;

/// A rotation that advances by a fixed increment each frame and wraps at a
/// full turn.
///
/// The angle is accumulated in `f64` so that long runs stay within float
/// tolerance of `(frames * increment) mod 2π`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    angle: f64,
    increment: f64,
    frames: u64,
}

impl Spin {
    /// Creates a spin starting at zero.
    #[must_use]
    pub fn new(increment: f32) -> Self {
        Self {
            angle: 0.0,
            increment: f64::from(increment),
            frames: 0,
        }
    }

    /// Advances one frame and returns the new angle in `[0, 2π)`.
    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + self.increment).rem_euclid(TAU);
        self.frames += 1;
        self.angle()
    }

    /// Returns the current angle in `[0, 2π)`.
    #[must_use]
    pub fn angle(&self) -> f32 {
        // Values just below 2π round up to it in f32
        (self.angle as f32).rem_euclid(std::f32::consts::TAU)
    }

    /// Returns the number of frames advanced.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wraps_at_full_turn() {
        let mut spin = Spin::new(std::f32::consts::FRAC_PI_2);
        for _ in 0..4 {
            spin.advance();
        }
        assert!(spin.angle() < 1e-5 || (TAU as f32 - spin.angle()) < 1e-5);
        assert_eq!(spin.frames(), 4);
    }

    #[test]
    fn test_angle_below_seam_stays_in_range() {
        let spin = Spin {
            angle: TAU - 1e-12,
            increment: 0.0,
            frames: 0,
        };
        assert!(spin.angle() < std::f32::consts::TAU);
        assert!(spin.angle() >= 0.0);
    }

    #[test]
    fn test_zero_frames() {
        let spin = Spin::new(0.05);
        assert_eq!(spin.angle(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_angle_after_f_frames(frames in 0u32..20_000, increment in 0.001f32..1.0) {
            let mut spin = Spin::new(increment);
            for _ in 0..frames {
                spin.advance();
            }
            let expected = (f64::from(frames) * f64::from(increment)).rem_euclid(TAU);
            let diff = (f64::from(spin.angle()) - expected).abs();
            // Values close to a full turn may land on either side of the seam
            prop_assert!(diff.min(TAU - diff) < 1e-4, "angle {} expected {}", spin.angle(), expected);
            prop_assert!(spin.angle() >= 0.0 && spin.angle() < std::f32::consts::TAU);
        }
    }
}
