//! Camera capture session
//!
//! Models acquiring the front camera and microphone, recording in chunks up
//! to a duration ceiling, previewing the result and either discarding or
//! saving it. Platform access goes through the traits in [`devices`].

pub mod devices;
pub mod error;
pub mod session;

pub use devices::{CameraStream, ChunkRecorder, Constraints, FacingMode, MediaDevices, ObjectUrls};
pub use error::{CaptureError, DeviceError};
pub use session::{
    CaptureSession, CaptureState, DEFAULT_MAX_DURATION_SECS, MediaBlob, Tick, Viewfinder,
};
