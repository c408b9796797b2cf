//! Capture error types

use thiserror::Error;

use crate::session::CaptureState;

/// Failures reported by the platform device layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Permission to use the camera or microphone was denied")]
    PermissionDenied,

    #[error("No matching camera or microphone was found")]
    NotFound,

    #[error("Device error: {0}")]
    Hardware(String),
}

/// Failures of capture session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Camera or microphone could not be acquired or used
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    /// Operation not allowed in the current state
    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: CaptureState,
    },

    /// Recording stopped before any data arrived
    #[error("Nothing was recorded")]
    NothingRecorded,
}
