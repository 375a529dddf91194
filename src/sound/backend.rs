//! Audio output implemented with rodio.
//!
//! The default output device is opened on demand. Each voice gets its own
//! detached `Sink`, so voices play concurrently and finish on their own.

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::voice::ScheduledVoice;
use super::AudioBackend;

/// Output backend that plays voices on the default rodio device.
#[derive(Default)]
pub struct RodioBackend {
    /// The audio output stream (must be kept alive for playback) and its handle.
    output: Option<(OutputStream, OutputStreamHandle)>,
    /// Set when the device stopped accepting new sinks.
    suspended: bool,
}

impl RodioBackend {
    /// Creates a backend without touching the audio hardware.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn open_default() -> Result<(OutputStream, OutputStreamHandle), SoundError> {
        OutputStream::try_default().map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))
    }
}

impl AudioBackend for RodioBackend {
    fn open(&mut self) -> Result<(), SoundError> {
        if self.output.is_none() {
            self.output = Some(Self::open_default()?);
            debug!("Audio output stream initialized");
        }
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.suspended || self.output.is_none()
    }

    fn resume(&mut self) -> Result<(), SoundError> {
        // Drop the stale stream before reopening the device.
        self.output = None;
        let output =
            Self::open_default().map_err(|e| SoundError::ResumeFailed(e.to_string()))?;
        self.output = Some(output);
        self.suspended = false;
        debug!("Audio output stream resumed");
        Ok(())
    }

    fn schedule(&mut self, voice: ScheduledVoice) -> Result<(), SoundError> {
        let Some((_, handle)) = &self.output else {
            return Err(SoundError::StreamError("output is not open".to_string()));
        };

        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(e) => {
                warn!("Audio output rejected a new sink, marking suspended: {}", e);
                self.suspended = true;
                return Err(SoundError::StreamError(e.to_string()));
            }
        };

        debug!(kind = ?voice.kind, offset = ?voice.offset, "Scheduling voice");
        sink.append(voice.source.delay(voice.offset));
        sink.detach(); // Non-blocking: the voice plays out after this returns
        Ok(())
    }
}

impl std::fmt::Debug for RodioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioBackend")
            .field("open", &self.output.is_some())
            .field("suspended", &self.suspended)
            .finish_non_exhaustive()
    }
}
