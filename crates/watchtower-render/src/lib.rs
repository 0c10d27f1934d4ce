//! Rendering backend for watchtower.
//!
//! This crate provides the wgpu-based engine behind
//! [`watchtower_core::FrameBackend`]:
//! - Device and surface setup, windowed or headless
//! - The render target pool, one offscreen texture per slot
//! - A GPU mirror of the scene with one pipeline for targets and one for the display
//! - Pixel readback and image saving

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// GPU sizes move between u32, u64 and usize
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

pub mod buffer;
pub mod engine;
pub mod error;
pub mod gpu_scene;
pub mod render_target;
pub mod screenshot;

pub use engine::{ObjectUniforms, RenderEngine, ViewUniforms};
pub use error::{RenderError, RenderResult};
pub use gpu_scene::GpuScene;
pub use render_target::{RenderTarget, RenderTargetPool, DEPTH_FORMAT, TARGET_FORMAT};
pub use screenshot::{encode_png, save_image, ScreenshotError};
