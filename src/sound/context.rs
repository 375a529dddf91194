//! Lazily created audio output context.
//!
//! The context opens its backend on first use and resumes it whenever the
//! backend reports itself suspended. A missing device is remembered: once
//! the backend fails to open with a device error, every later call is a
//! silent no-op instead of an error.

use tracing::{debug, warn};

use super::error::SoundError;
use super::voice::ScheduledVoice;
use super::AudioBackend;

/// Lifecycle of the output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Nothing opened yet
    Uninitialized,
    /// Opened and ready for voices
    Ready,
    /// No audio device; sounds are skipped
    Unavailable,
}

/// Owns the output backend and its lifecycle.
#[derive(Debug)]
pub struct AudioContext<B> {
    backend: B,
    state: ContextState,
}

impl<B: AudioBackend> AudioContext<B> {
    /// Wraps `backend` without opening it.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ContextState::Uninitialized,
        }
    }

    /// Opens the backend if needed and resumes it if suspended.
    ///
    /// Idempotent. Returns `Ok(false)` when no device exists, in which case
    /// the caller should skip playback silently.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::ResumeFailed` if a suspended backend could not be
    /// resumed, or the backend's error if opening failed for another reason.
    pub fn ensure_ready(&mut self) -> Result<bool, SoundError> {
        match self.state {
            ContextState::Unavailable => return Ok(false),
            ContextState::Uninitialized => match self.backend.open() {
                Ok(()) => {
                    debug!("Audio context created");
                    self.state = ContextState::Ready;
                }
                Err(e) if e.is_device_error() => {
                    warn!("Audio not available, sound disabled: {}", e);
                    self.state = ContextState::Unavailable;
                    return Ok(false);
                }
                Err(e) => return Err(e),
            },
            ContextState::Ready => {}
        }

        if self.backend.is_suspended() {
            debug!("Audio context suspended, resuming");
            self.backend.resume().map_err(|e| match e {
                SoundError::ResumeFailed(_) => e,
                other => SoundError::ResumeFailed(other.to_string()),
            })?;
        }

        Ok(true)
    }

    /// Hands a voice to the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if it refused the voice.
    pub fn schedule(&mut self, voice: ScheduledVoice) -> Result<(), SoundError> {
        self.backend.schedule(voice)
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::MockAudioBackend;

    #[test]
    fn test_starts_uninitialized() {
        let context = AudioContext::new(MockAudioBackend::new());
        assert_eq!(context.state(), ContextState::Uninitialized);
        assert_eq!(context.backend().open_count(), 0);
    }

    #[test]
    fn test_ensure_ready_is_idempotent() {
        let mut context = AudioContext::new(MockAudioBackend::new());
        assert!(context.ensure_ready().unwrap());
        assert!(context.ensure_ready().unwrap());
        assert_eq!(context.state(), ContextState::Ready);
        assert_eq!(context.backend().open_count(), 1);
    }

    #[test]
    fn test_unavailable_is_silent_and_sticky() {
        let backend = MockAudioBackend::new();
        backend.set_available(false);
        let mut context = AudioContext::new(backend);

        assert!(!context.ensure_ready().unwrap());
        assert!(!context.ensure_ready().unwrap());
        assert_eq!(context.state(), ContextState::Unavailable);
        assert_eq!(context.backend().open_count(), 1);
    }

    #[test]
    fn test_resumes_when_suspended() {
        let backend = MockAudioBackend::new();
        backend.set_suspended(true);
        let mut context = AudioContext::new(backend);

        assert!(context.ensure_ready().unwrap());
        assert_eq!(context.backend().resume_count(), 1);
        assert!(!context.backend().is_suspended());

        context.ensure_ready().unwrap();
        assert_eq!(context.backend().resume_count(), 1);
    }

    #[test]
    fn test_resume_failure_is_reported() {
        let backend = MockAudioBackend::new();
        backend.set_suspended(true);
        backend.set_resume_fails(true);
        let mut context = AudioContext::new(backend);

        let result = context.ensure_ready();
        assert!(matches!(result, Err(SoundError::ResumeFailed(_))));
        // Still ready to retry later.
        assert_eq!(context.state(), ContextState::Ready);
    }
}
