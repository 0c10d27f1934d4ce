//! Core logic for watchtower.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`Config`] with the layout and tuning constants
//! - [`CameraRig`] with the orbiting primary camera and fixed secondary cameras
//! - [`Selector`] turning pointer presses into active-camera changes
//! - [`Compositor`] ordering the render passes of each frame through a [`FrameBackend`]
//! - [`Session`] driving one frame at a time

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors and builders return values that are obviously used
#![allow(clippy::must_use_candidate)]
// Pixel and index math converts between integer and float freely
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod animation;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod error;
pub mod mesh;
pub mod orbit;
pub mod pointer;
pub mod rig;
pub mod scene;
pub mod selection;
pub mod session;
pub mod surface;
pub mod target;

pub use animation::Spin;
pub use camera::Camera;
pub use compositor::{Compositor, Destination, FrameBackend, Pass, ViewSource};
pub use config::{Config, SlotCamera};
pub use error::{Result, WatchtowerError};
pub use mesh::{MeshData, Vertex};
pub use orbit::OrbitControls;
pub use pointer::{PointerEvent, Ray};
pub use rig::{CameraRig, SecondaryCamera};
pub use scene::{
    reference_scene, Lighting, Material, MaterialSource, ObjectId, Scene, SceneLayout,
    SceneObject, TextureData, TextureId, Transform,
};
pub use selection::{PickOutcome, SelectionState, Selector};
pub use session::Session;
pub use surface::Surface;
pub use target::{plan_slots, SlotDescriptor, TargetSize};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
