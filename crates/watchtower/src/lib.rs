//! watchtower: an interactive 3D scene whose in-world screens show live
//! views from fixed surveillance cameras.
//!
//! Clicking a screen cycles which camera feeds it. Every frame renders each
//! secondary camera into its offscreen target first, then the primary orbiting
//! view that samples those targets, so screens never show a stale image.
//!
//! # Quick Start
//!
//! ```no_run
//! fn main() -> watchtower::Result<()> {
//!     watchtower::run()
//! }
//! ```
//!
//! # Crates
//!
//! - [`watchtower_core`] - configuration, cameras, picking, selection and frame ordering
//! - [`watchtower_render`] - the wgpu engine that draws the passes
//! - this crate - the window, input mapping, asset loading and headless rendering

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Window coordinates arrive as f64 and feed f32 camera math
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

mod app;
pub mod assets;
pub mod headless;

use std::path::Path;

// Re-export core types
pub use watchtower_core::{
    reference_scene, Camera, CameraRig, Compositor, Config, Destination, FrameBackend, Material,
    PickOutcome, PointerEvent, Result, Scene, SceneLayout, SceneObject, SelectionState, Session,
    ViewSource, WatchtowerError,
};
pub use watchtower_core::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export render types
pub use watchtower_render::{RenderEngine, RenderError};

pub use assets::{AssetLoader, PendingAsset};
pub use headless::{render_to_file, Headless};

/// Runs the viewer with the default configuration.
pub fn run() -> Result<()> {
    run_with_config(Config::default())
}

/// Runs the viewer with the configuration stored at `path`.
pub fn run_with_config_file(path: impl AsRef<Path>) -> Result<()> {
    let config = Config::from_json_file(path)?;
    run_with_config(config)
}

/// Runs the viewer until its window closes.
///
/// Setup errors (invalid configuration, no GPU, render target allocation)
/// are returned before the first frame. Asset failures are logged only.
pub fn run_with_config(config: Config) -> Result<()> {
    let _ = env_logger::try_init();

    let (width, height) = (config.window.width, config.window.height);
    let layout = reference_scene(&config);
    let mut session = Session::new(config, layout, width, height)?;

    let mut assets = AssetLoader::new();
    assets::load_startup_assets(&mut session, &mut assets);

    log::info!("watchtower starting");
    app::run_app(session, assets)
}
