//! Platform seams for camera, recorder and object URLs

use async_trait::async_trait;

use crate::error::DeviceError;

/// Which camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// Requested capture constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    pub facing: FacingMode,
    pub audio: bool,
}

impl Default for Constraints {
    /// Front-facing camera with microphone
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            audio: true,
        }
    }
}

/// Access to cameras and microphones
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn open(&self, constraints: Constraints) -> Result<Box<dyn CameraStream>, DeviceError>;
}

/// A live camera/microphone stream
pub trait CameraStream: Send {
    /// Attach a chunked recorder to the stream and start it
    fn start_recorder(&mut self) -> Result<Box<dyn ChunkRecorder>, DeviceError>;

    /// Stop every track; calling it again is a no-op
    fn stop_tracks(&mut self);
}

/// A recorder emitting encoded media in chunks
pub trait ChunkRecorder: Send {
    /// Drain chunks produced since the last call
    fn take_chunks(&mut self) -> Vec<Vec<u8>>;

    /// Stop recording and return whatever was still buffered
    fn stop(&mut self) -> Vec<Vec<u8>>;
}

/// Creates and revokes previewable URLs for in-memory media
pub trait ObjectUrls: Send + Sync {
    fn create(&self, data: &[u8], content_type: &str) -> String;

    fn revoke(&self, url: &str);
}
