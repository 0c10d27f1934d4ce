//! Per-frame pass ordering.
//!
//! Every secondary view is rendered into its target before the primary view
//! is rendered to the display, so the display always samples targets written
//! earlier in the same frame.

use crate::camera::Camera;
use crate::config::SlotCamera;
use crate::rig::CameraRig;
use crate::scene::Scene;
use crate::selection::SelectionState;
use crate::target::SlotDescriptor;

/// Where a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The render target of a slot.
    Target(usize),
    /// The window or headless display image.
    Display,
}

/// Which camera a pass is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSource {
    /// The interactive camera.
    Primary,
    /// A secondary camera by index.
    Secondary(usize),
}

/// One render pass of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Where the pass writes.
    pub destination: Destination,
    /// The camera it renders from.
    pub view: ViewSource,
}

/// Executes render passes. Implemented by the GPU engine and by test doubles.
pub trait FrameBackend {
    /// Starts a frame. Called once before any pass.
    fn begin_frame(&mut self, scene: &Scene);

    /// Renders `scene` from `camera` into `destination`.
    fn render_view(
        &mut self,
        destination: Destination,
        view: ViewSource,
        camera: &Camera,
        scene: &Scene,
    );

    /// Finishes the frame. The display pass has been issued.
    fn end_frame(&mut self);
}

/// Orders the passes of each frame.
#[derive(Debug, Clone)]
pub struct Compositor {
    slots: Vec<SlotDescriptor>,
}

impl Compositor {
    /// Creates a compositor over the planned slots.
    #[must_use]
    pub fn new(slots: Vec<SlotDescriptor>) -> Self {
        Self { slots }
    }

    /// Returns the slots.
    #[must_use]
    pub fn slots(&self) -> &[SlotDescriptor] {
        &self.slots
    }

    /// Returns the secondary camera a slot renders for the given selection.
    #[must_use]
    pub fn camera_for_slot(&self, slot: usize, selection: &SelectionState) -> Option<usize> {
        self.slots.get(slot).map(|s| match s.camera {
            SlotCamera::Active => selection.index(),
            SlotCamera::Fixed(index) => index,
        })
    }

    /// Returns the ordered passes of one frame: every target, then the display.
    #[must_use]
    pub fn plan(&self, selection: &SelectionState) -> Vec<Pass> {
        self.slots
            .iter()
            .filter_map(|slot| {
                self.camera_for_slot(slot.index, selection).map(|camera| Pass {
                    destination: Destination::Target(slot.index),
                    view: ViewSource::Secondary(camera),
                })
            })
            .chain(std::iter::once(Pass {
                destination: Destination::Display,
                view: ViewSource::Primary,
            }))
            .collect()
    }

    /// Issues one frame to `backend`.
    pub fn compose<B: FrameBackend + ?Sized>(
        &self,
        rig: &CameraRig,
        selection: &SelectionState,
        scene: &Scene,
        backend: &mut B,
    ) {
        backend.begin_frame(scene);
        for pass in self.plan(selection) {
            let camera = match pass.view {
                ViewSource::Primary => Some(rig.primary()),
                ViewSource::Secondary(index) => rig.secondary(index).map(|s| &s.camera),
            };
            match camera {
                Some(camera) => backend.render_view(pass.destination, pass.view, camera, scene),
                None => log::warn!("no camera for {:?}, pass skipped", pass.view),
            }
        }
        backend.end_frame();
    }
}
