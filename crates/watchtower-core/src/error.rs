//! Error types for watchtower.

use thiserror::Error;

/// The main error type for watchtower operations.
#[derive(Error, Debug)]
pub enum WatchtowerError {
    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An offscreen buffer could not be obtained at startup.
    #[error("failed to allocate render target '{label}': {reason}")]
    AllocationFailure { label: String, reason: String },

    /// An asset could not be loaded. Never fatal to the render loop.
    #[error("failed to load asset '{path}': {reason}")]
    AssetLoad { path: String, reason: String },

    /// Rendering backend error.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WatchtowerError {
    /// Returns true if this error must abort startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WatchtowerError::AssetLoad { .. })
    }
}

/// A specialized Result type for watchtower operations.
pub type Result<T> = std::result::Result<T, WatchtowerError>;
