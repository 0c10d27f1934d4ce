//! Active-camera selection driven by clicks on pickable surfaces.
//!
//! The active secondary camera is an index into a fixed-size cycle. A pointer
//! press that hits any pickable surface advances it by one, wrapping at the
//! end; a press that hits nothing leaves it untouched.

use crate::camera::Camera;
use crate::pointer::{PointerEvent, Ray};
use crate::scene::ObjectId;
use crate::surface::Surface;

/// The currently active secondary camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    index: usize,
    len: usize,
}

impl SelectionState {
    /// Creates a cycle of `len` cameras starting at index 0.
    ///
    /// A zero length is treated as a cycle of one.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    /// Returns the active index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the cycle length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a cycle holds at least one camera.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Moves to the next camera, wrapping around, and returns the new index.
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.len;
        self.index
    }
}

/// Result of a pointer press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// A pickable surface was hit and the selection advanced.
    Hit {
        /// The surface's object.
        object: ObjectId,
        /// Distance along the view ray.
        distance: f32,
        /// Index before the press.
        previous: usize,
        /// Index after the press.
        active: usize,
    },
    /// Nothing pickable under the pointer.
    Miss,
}

/// Converts pointer presses into selection changes.
#[derive(Debug, Clone)]
pub struct Selector {
    state: SelectionState,
    surfaces: Vec<Surface>,
}

impl Selector {
    /// Creates a selector over `camera_count` cameras.
    #[must_use]
    pub fn new(camera_count: usize, surfaces: Vec<Surface>) -> Self {
        Self {
            state: SelectionState::new(camera_count),
            surfaces,
        }
    }

    /// Returns the selection state.
    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Returns the pickable surfaces.
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Replaces the pickable surfaces.
    pub fn set_surfaces(&mut self, surfaces: Vec<Surface>) {
        self.surfaces = surfaces;
    }

    /// Finds the closest pickable surface under the pointer.
    #[must_use]
    pub fn pick(&self, event: &PointerEvent, camera: &Camera) -> Option<(ObjectId, f32)> {
        let ndc = event.ndc()?;
        let ray = Ray::from_camera(camera, ndc)?;
        self.surfaces
            .iter()
            .filter_map(|s| s.intersect(&ray).map(|t| (s.object, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Handles a pointer press seen through `camera`.
    pub fn handle_pointer_down(&mut self, event: &PointerEvent, camera: &Camera) -> PickOutcome {
        match self.pick(event, camera) {
            Some((object, distance)) => {
                let previous = self.state.index();
                let active = self.state.advance();
                PickOutcome::Hit {
                    object,
                    distance,
                    previous,
                    active,
                }
            }
            None => PickOutcome::Miss,
        }
    }
}
