//! Capture session state machine
//!
//! ```text
//! Initializing -> Idle -> Recording -> Previewing -> Saved
//!                  ^                       |
//!                  +------- discard -------+
//! ```
//!
//! `Cancelled` and `Failed` are terminal. Leaving the session by any path,
//! including dropping it, stops the recorder and every track and revokes
//! any preview URL still outstanding.

use std::{future::Future, sync::Arc, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    devices::{CameraStream, ChunkRecorder, Constraints, MediaDevices, ObjectUrls},
    error::CaptureError,
};

/// Longest recording before the session stops itself
pub const DEFAULT_MAX_DURATION_SECS: u32 = 60;

const TICK: Duration = Duration::from_secs(1);
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Initializing,
    Idle,
    Recording,
    Previewing,
    Saved,
    Cancelled,
    Failed,
}

impl CaptureState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureState::Saved | CaptureState::Cancelled | CaptureState::Failed
        )
    }
}

/// What the viewfinder should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewfinder {
    /// Nothing to show
    Blank,
    /// The live camera stream
    Live,
    /// Playback of the recorded clip
    Preview(String),
}

/// Result of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Recording { elapsed_secs: u32 },
    /// Ceiling reached; the session is now previewing
    LimitReached,
}

/// A finished recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct CaptureSession {
    state: CaptureState,
    max_duration_secs: u32,
    elapsed_secs: u32,
    content_type: String,
    urls: Arc<dyn ObjectUrls>,
    stream: Option<Box<dyn CameraStream>>,
    recorder: Option<Box<dyn ChunkRecorder>>,
    chunks: Vec<Vec<u8>>,
    blob: Option<MediaBlob>,
    preview_url: Option<String>,
}

impl CaptureSession {
    pub fn new(urls: Arc<dyn ObjectUrls>) -> Self {
        Self {
            state: CaptureState::Initializing,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            elapsed_secs: 0,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            urls,
            stream: None,
            recorder: None,
            chunks: Vec::new(),
            blob: None,
            preview_url: None,
        }
    }

    pub fn with_max_duration(mut self, secs: u32) -> Self {
        self.max_duration_secs = secs.max(1);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn viewfinder(&self) -> Viewfinder {
        match (&self.preview_url, &self.stream) {
            (Some(url), _) => Viewfinder::Preview(url.clone()),
            (None, Some(_)) => Viewfinder::Live,
            (None, None) => Viewfinder::Blank,
        }
    }

    /// Elapsed recording time as `MM:SS`
    pub fn countdown_label(&self) -> String {
        format!("{:02}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    /// Time left before the ceiling stops the recording
    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs.saturating_sub(self.elapsed_secs) as u64)
    }

    fn expect_state(
        &self,
        expected: CaptureState,
        operation: &'static str,
    ) -> Result<(), CaptureError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CaptureError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Acquire the front camera and microphone
    pub async fn initialize(&mut self, devices: &dyn MediaDevices) -> Result<(), CaptureError> {
        self.expect_state(CaptureState::Initializing, "initialize")?;

        match devices.open(Constraints::default()).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CaptureState::Idle;
                info!("Camera ready");
                Ok(())
            }
            Err(e) => {
                warn!("Unable to access camera: {}", e);
                self.teardown();
                self.state = CaptureState::Failed;
                Err(CaptureError::DeviceUnavailable(e))
            }
        }
    }

    /// Begin a new recording against the live stream
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.expect_state(CaptureState::Idle, "start recording")?;

        let stream = self.stream.as_mut().ok_or(CaptureError::InvalidState {
            operation: "start recording",
            state: self.state,
        })?;
        let recorder = stream.start_recorder()?;

        self.recorder = Some(recorder);
        self.chunks.clear();
        self.elapsed_secs = 0;
        self.state = CaptureState::Recording;

        debug!("Recording started");
        Ok(())
    }

    fn collect(&mut self, chunks: Vec<Vec<u8>>) {
        self.chunks
            .extend(chunks.into_iter().filter(|chunk| !chunk.is_empty()));
    }

    /// Advance the recording clock by one second
    pub fn tick(&mut self) -> Result<Tick, CaptureError> {
        self.expect_state(CaptureState::Recording, "tick")?;

        if let Some(recorder) = self.recorder.as_mut() {
            let chunks = recorder.take_chunks();
            self.collect(chunks);
        }

        self.elapsed_secs += 1;

        if self.elapsed_secs >= self.max_duration_secs {
            info!("Recording reached {}s limit", self.max_duration_secs);
            self.stop_recording()?;
            return Ok(Tick::LimitReached);
        }

        Ok(Tick::Recording {
            elapsed_secs: self.elapsed_secs,
        })
    }

    /// Stop recording and prepare the preview; returns the preview URL
    pub fn stop_recording(&mut self) -> Result<String, CaptureError> {
        self.expect_state(CaptureState::Recording, "stop recording")?;

        if let Some(mut recorder) = self.recorder.take() {
            let chunks = recorder.stop();
            self.collect(chunks);
        }

        if self.chunks.is_empty() {
            self.state = CaptureState::Idle;
            return Err(CaptureError::NothingRecorded);
        }

        let blob = MediaBlob {
            data: self.chunks.concat(),
            content_type: self.content_type.clone(),
        };
        let url = self.urls.create(&blob.data, &blob.content_type);

        debug!(
            "Recorded {} bytes in {} chunks",
            blob.data.len(),
            self.chunks.len()
        );

        self.blob = Some(blob);
        self.preview_url = Some(url.clone());
        self.state = CaptureState::Previewing;

        Ok(url)
    }

    /// Drive the recording clock until `stop` resolves or the ceiling is hit
    ///
    /// The session must already be recording. Dropping the returned future
    /// cancels the timer and leaves the session recording.
    pub async fn record_until<F>(&mut self, stop: F) -> Result<String, CaptureError>
    where
        F: Future<Output = ()>,
    {
        self.expect_state(CaptureState::Recording, "record")?;

        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = &mut stop => return self.stop_recording(),
                _ = ticker.tick() => {
                    if let Tick::LimitReached = self.tick()? {
                        return self
                            .preview_url
                            .clone()
                            .ok_or(CaptureError::NothingRecorded);
                    }
                }
            }
        }
    }

    /// Throw the recording away and return to the live view
    pub fn discard(&mut self) -> Result<(), CaptureError> {
        self.expect_state(CaptureState::Previewing, "discard")?;

        self.revoke_preview();
        self.chunks.clear();
        self.blob = None;
        self.elapsed_secs = 0;
        self.state = CaptureState::Idle;

        Ok(())
    }

    /// Hand the recording to the caller and release the devices
    pub fn save(&mut self) -> Result<MediaBlob, CaptureError> {
        self.expect_state(CaptureState::Previewing, "save")?;

        let blob = self.blob.take().ok_or(CaptureError::NothingRecorded)?;
        self.teardown();
        self.state = CaptureState::Saved;

        info!("Recording saved ({} bytes)", blob.data.len());
        Ok(blob)
    }

    /// Abandon the session from any state
    pub fn cancel(&mut self) {
        self.teardown();
        if !self.state.is_terminal() {
            self.state = CaptureState::Cancelled;
        }
    }

    fn revoke_preview(&mut self) {
        if let Some(url) = self.preview_url.take() {
            self.urls.revoke(&url);
        }
    }

    fn teardown(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
        self.revoke_preview();
        self.chunks.clear();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoUrls;

    impl ObjectUrls for NoUrls {
        fn create(&self, _data: &[u8], _content_type: &str) -> String {
            "blob:test".to_string()
        }

        fn revoke(&self, _url: &str) {}
    }

    #[test]
    fn test_countdown_label_formats_minutes_and_seconds() {
        let mut session = CaptureSession::new(Arc::new(NoUrls));
        assert_eq!(session.countdown_label(), "00:00");

        session.elapsed_secs = 7;
        assert_eq!(session.countdown_label(), "00:07");

        session.elapsed_secs = 60;
        assert_eq!(session.countdown_label(), "01:00");
    }

    #[test]
    fn test_remaining_counts_down_to_zero() {
        let mut session = CaptureSession::new(Arc::new(NoUrls)).with_max_duration(10);
        assert_eq!(session.remaining(), Duration::from_secs(10));

        session.elapsed_secs = 4;
        assert_eq!(session.remaining(), Duration::from_secs(6));

        session.elapsed_secs = 12;
        assert_eq!(session.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_operations_rejected_before_initialization() {
        let mut session = CaptureSession::new(Arc::new(NoUrls));

        assert_eq!(
            session.start_recording(),
            Err(CaptureError::InvalidState {
                operation: "start recording",
                state: CaptureState::Initializing,
            })
        );
        assert!(session.save().is_err());

        session.cancel();
        assert_eq!(session.state(), CaptureState::Cancelled);
        assert_eq!(session.viewfinder(), Viewfinder::Blank);
    }
}
