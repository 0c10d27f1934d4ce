//! Headless rendering API.
//!
//! Drives a [`Session`] against an offscreen engine without opening a window.
//! Useful for integration tests and batch screenshots.

use std::path::Path;

use pollster::FutureExt;
use watchtower_core::config::ModelConfig;
use watchtower_core::{
    reference_scene, Config, PickOutcome, PointerEvent, Result, SceneLayout, Session,
};
use watchtower_render::RenderEngine;

use crate::assets::{load_startup_assets, AssetLoader};

/// A session rendering into offscreen images.
pub struct Headless {
    session: Session,
    engine: RenderEngine,
    assets: AssetLoader,
}

impl Headless {
    /// Creates an offscreen engine of `width` x `height` pixels for `layout`.
    ///
    /// Fails when the configuration is invalid, no adapter is available, or a
    /// render target cannot be allocated.
    pub fn new(config: Config, layout: SceneLayout, width: u32, height: u32) -> Result<Self> {
        let session = Session::new(config, layout, width, height)?;
        let engine = RenderEngine::new_headless(width, height, session.compositor().slots())
            .block_on()?;
        Ok(Self {
            session,
            engine,
            assets: AssetLoader::new(),
        })
    }

    /// Creates an offscreen engine for the reference scene, with its startup assets.
    pub fn with_reference_scene(config: Config, width: u32, height: u32) -> Result<Self> {
        let layout = reference_scene(&config);
        let mut headless = Self::new(config, layout, width, height)?;
        load_startup_assets(&mut headless.session, &mut headless.assets);
        Ok(headless)
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session for mutation.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Returns the engine.
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Returns the display size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.engine.dimensions()
    }

    /// Presses the pointer at display pixel (`x`, `y`).
    pub fn click(&mut self, x: f32, y: f32) -> PickOutcome {
        let (width, height) = self.dimensions();
        self.session
            .handle_pointer_down(PointerEvent::new(x, y, width, height))
    }

    /// Starts loading a model in the background. It joins the scene on a
    /// later [`Headless::step`].
    pub fn spawn_model(&mut self, model: ModelConfig) {
        self.assets.spawn_model(model);
    }

    /// Returns the number of models that have not arrived yet.
    pub fn models_in_flight(&self) -> usize {
        self.assets.in_flight()
    }

    /// Renders one frame.
    pub fn step(&mut self) {
        self.assets.poll(&mut self.session);
        self.session.tick(&mut self.engine);
    }

    /// Renders `frames` frames.
    pub fn step_n(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Reads back the last displayed frame as RGBA8, top row first.
    pub fn capture_display(&self) -> Result<Vec<u8>> {
        Ok(self.engine.capture_display()?)
    }

    /// Reads back the render target of `slot` as RGBA8, top row first.
    pub fn capture_target(&self, slot: usize) -> Result<Vec<u8>> {
        Ok(self.engine.capture_target(slot)?)
    }
}

/// Renders `frames` frames of the reference scene and saves the last one.
///
/// The image format follows the file extension (PNG or JPEG).
///
/// # Example
/// ```no_run
/// use watchtower::{render_to_file, Config};
///
/// render_to_file(Config::default(), "watchtower.png", 800, 600, 30).unwrap();
/// ```
pub fn render_to_file(
    config: Config,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    frames: usize,
) -> Result<()> {
    let _ = env_logger::try_init();
    let mut headless = Headless::with_reference_scene(config, width, height)?;
    headless.step_n(frames.max(1));

    let pixels = headless.capture_display()?;
    let (width, height) = headless.dimensions();
    watchtower_render::save_image(path, &pixels, width, height)?;
    Ok(())
}
