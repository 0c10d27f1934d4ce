//! The per-frame driver tying selection, animation, cameras and passes together.

use crate::animation::Spin;
use crate::compositor::{Compositor, FrameBackend};
use crate::config::Config;
use crate::error::Result;
use crate::pointer::PointerEvent;
use crate::rig::CameraRig;
use crate::scene::{ObjectId, Scene, SceneLayout, SceneObject};
use crate::selection::{PickOutcome, Selector};
use crate::target::plan_slots;

/// All state the render loop mutates.
///
/// A session is driven from a single thread: input handlers call
/// [`Session::handle_pointer_down`] and [`Session::resize`], and the display
/// refresh calls [`Session::tick`].
#[derive(Debug)]
pub struct Session {
    config: Config,
    scene: Scene,
    spinner: Option<ObjectId>,
    ground: Option<ObjectId>,
    rig: CameraRig,
    selector: Selector,
    spin: Spin,
    compositor: Compositor,
    frame: u64,
}

impl Session {
    /// Creates a session for a viewport of `width` x `height` pixels.
    pub fn new(config: Config, layout: SceneLayout, width: u32, height: u32) -> Result<Self> {
        config.validate()?;
        let slots = plan_slots(&config.render_targets)?;
        let rig = CameraRig::new(&config, width, height);
        let selector = Selector::new(rig.secondary_count(), layout.scene.pickable_surfaces());
        log::info!(
            "session with {} cameras, {} render targets of {}x{}",
            rig.secondary_count(),
            slots.len(),
            slots.first().map_or(0, |s| s.size.width),
            slots.first().map_or(0, |s| s.size.height),
        );

        Ok(Self {
            spin: Spin::new(config.animation.rotation_increment),
            compositor: Compositor::new(slots),
            scene: layout.scene,
            spinner: layout.spinner,
            ground: layout.ground,
            config,
            rig,
            selector,
            frame: 0,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the scene for mutation. Call [`Session::refresh_pickables`]
    /// after moving or adding pickable quads.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Returns the ground object, if the layout has one.
    pub fn ground(&self) -> Option<ObjectId> {
        self.ground
    }

    /// Returns the cameras.
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Returns the cameras for mutation.
    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    /// Returns the selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Returns the compositor.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Returns the animation state.
    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    /// Returns the number of completed frames.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Appends an object to the scene.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let pickable = object.is_pickable();
        let id = self.scene.add_object(object);
        if pickable {
            self.refresh_pickables();
        }
        id
    }

    /// Rebuilds the selector's surfaces from the scene.
    pub fn refresh_pickables(&mut self) {
        self.selector.set_surfaces(self.scene.pickable_surfaces());
    }

    /// Handles a pointer press in window pixels.
    pub fn handle_pointer_down(&mut self, event: PointerEvent) -> PickOutcome {
        let outcome = self.selector.handle_pointer_down(&event, self.rig.primary());
        match outcome {
            PickOutcome::Hit { active, .. } => {
                let label = self
                    .rig
                    .secondary(active)
                    .map_or("?", |s| s.label.as_str());
                log::info!(
                    "switched to camera {} of {} ({label})",
                    active + 1,
                    self.selector.state().len(),
                );
            }
            PickOutcome::Miss => {
                log::debug!("pointer down at ({}, {}) hit nothing", event.x, event.y);
            }
        }
        outcome
    }

    /// Updates the viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.rig.resize(width, height);
    }

    /// Runs one frame: animation, orbit damping, then every pass in order.
    pub fn tick<B: FrameBackend + ?Sized>(&mut self, backend: &mut B) {
        let angle = self.spin.advance();
        if let Some(spinner) = self.spinner {
            self.scene.set_yaw(spinner, angle);
        }

        self.rig.update_controls();

        self.compositor
            .compose(&self.rig, self.selector.state(), &self.scene, backend);
        self.frame += 1;
    }
}
