//! Application window and event loop management.

mod input;

use std::sync::Arc;

use winit::event_loop::EventLoop;
use winit::window::Window;

use watchtower_core::{Result, Session, WatchtowerError};
use watchtower_render::RenderEngine;

use crate::assets::AssetLoader;

/// Pixels of trackpad scrolling that count as one wheel notch.
const PIXELS_PER_WHEEL_STEP: f64 = 50.0;

/// The watchtower application state.
pub struct App {
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) session: Session,
    pub(super) assets: AssetLoader,
    // Mouse state for camera control
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    pub(super) right_mouse_down: bool,
    // Startup failure that ended the event loop
    pub(super) error: Option<WatchtowerError>,
}

impl App {
    /// Creates an application around a ready session.
    pub fn new(session: Session, assets: AssetLoader) -> Self {
        Self {
            window: None,
            engine: None,
            session,
            assets,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            error: None,
        }
    }

    /// Polls finished assets and renders one frame.
    fn render(&mut self) {
        self.assets.poll(&mut self.session);
        if let Some(engine) = &mut self.engine {
            self.session.tick(engine);
        }
    }

    /// Returns the window size in physical pixels.
    fn viewport(&self) -> (u32, u32) {
        self.window.as_ref().map_or_else(
            || self.session.rig().viewport(),
            |w| {
                let size = w.inner_size();
                (size.width, size.height)
            },
        )
    }
}

/// Runs the event loop until the window closes.
pub fn run_app(session: Session, assets: AssetLoader) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| WatchtowerError::Render(format!("event loop: {e}")))?;
    let mut app = App::new(session, assets);

    event_loop
        .run_app(&mut app)
        .map_err(|e| WatchtowerError::Render(format!("event loop: {e}")))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
