//! Rendering error types.

use thiserror::Error;
use watchtower_core::WatchtowerError;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable format.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// A render target could not be created.
    #[error("failed to allocate {width}x{height} render target for slot {slot}: {reason}")]
    TargetAllocationFailed {
        slot: usize,
        width: u32,
        height: u32,
        reason: String,
    },

    /// The requested image does not exist on this engine.
    #[error("no capturable image: {0}")]
    CaptureUnavailable(String),

    /// Mapping a readback buffer failed.
    #[error("GPU buffer mapping failed")]
    ReadbackFailed,
}

impl From<RenderError> for WatchtowerError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::TargetAllocationFailed { slot, .. } => {
                WatchtowerError::AllocationFailure {
                    label: format!("slot {slot}"),
                    reason: err.to_string(),
                }
            }
            other => WatchtowerError::Render(other.to_string()),
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_failure_is_allocation_failure() {
        let err: WatchtowerError = RenderError::TargetAllocationFailed {
            slot: 1,
            width: 99_999,
            height: 4,
            reason: "exceeds device limit".into(),
        }
        .into();
        assert!(matches!(err, WatchtowerError::AllocationFailure { .. }));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("99999x4"));
    }

    #[test]
    fn test_other_errors_map_to_render() {
        let err: WatchtowerError = RenderError::AdapterCreationFailed.into();
        assert!(matches!(err, WatchtowerError::Render(_)));
    }
}
