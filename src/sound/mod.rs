//! Synthesized sound output for the countdown timer.
//!
//! This module renders tick and alarm sounds without any sample assets:
//!
//! - Oscillators, noise and a high-pass filter build one-shot voices
//! - A lazily opened output context plays them on the audio device
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  ToneSynthesizer │ ← prime / emit_tick / emit_alarm
//! └────────┬─────────┘
//!          │ ScheduledVoice
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   AudioContext   │────▶│   AudioBackend   │
//! │ (lazy, resumes)  │     │ rodio / mock     │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use ticktock::sound::{RodioBackend, ToneSynthesizer};
//!
//! let mut synth = ToneSynthesizer::new(RodioBackend::new());
//!
//! // Open the output without a sound, then tick twice (tick, tock).
//! synth.prime().ok();
//! synth.emit_tick(0.5, false).ok();
//! synth.emit_tick(0.5, false).ok();
//! synth.emit_alarm(0.5).ok();
//! ```

mod backend;
mod context;
mod error;
mod filter;
mod synth;
mod voice;

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use backend::RodioBackend;
pub use context::{AudioContext, ContextState};
pub use error::SoundError;
pub use filter::HighPassFilter;
pub use synth::{Timbre, ToneSynthesizer, ALARM_DURATION, TICK_DURATION};
pub use voice::{ExponentialRamp, ScheduledVoice, VoiceKind, ENVELOPE_FLOOR};

/// Trait for audio output implementations.
///
/// This trait abstracts the platform output, allowing for different
/// implementations (rodio-based, mock for testing). Scheduling is
/// fire-and-forget: a voice plays out on its own once accepted.
pub trait AudioBackend {
    /// Opens the output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if there is no device.
    fn open(&mut self) -> Result<(), SoundError>;

    /// Returns true if the output must be resumed before use.
    fn is_suspended(&self) -> bool;

    /// Resumes a suspended output.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to resume.
    fn resume(&mut self) -> Result<(), SoundError>;

    /// Starts a voice after its offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the output refused the voice.
    fn schedule(&mut self, voice: ScheduledVoice) -> Result<(), SoundError>;
}

// ============================================================================
// MockAudioBackend
// ============================================================================

/// A voice captured by [`MockAudioBackend`], rendered to samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVoice {
    pub kind: VoiceKind,
    pub frequency: f32,
    pub peak: f32,
    pub offset: Duration,
    pub duration: Duration,
    pub samples: Vec<f32>,
}

#[derive(Debug, Default)]
struct MockState {
    voices: Vec<RecordedVoice>,
    unavailable: bool,
    suspended: bool,
    resume_fails: bool,
    should_fail: bool,
    open_count: usize,
    resume_count: usize,
}

/// Mock audio backend for testing.
///
/// Clones share state, so a test can keep one clone for inspection while
/// the synthesizer owns another.
#[derive(Debug, Clone, Default)]
pub struct MockAudioBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn set_available(&self, available: bool) {
        self.with_state(|s| s.unavailable = !available);
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.with_state(|s| s.suspended = suspended);
    }

    pub fn set_resume_fails(&self, fails: bool) {
        self.with_state(|s| s.resume_fails = fails);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.with_state(|s| s.should_fail = should_fail);
    }

    #[must_use]
    pub fn voices(&self) -> Vec<RecordedVoice> {
        self.with_state(|s| s.voices.clone())
    }

    #[must_use]
    pub fn voice_count(&self) -> usize {
        self.with_state(|s| s.voices.len())
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.with_state(|s| s.open_count)
    }

    #[must_use]
    pub fn resume_count(&self) -> usize {
        self.with_state(|s| s.resume_count)
    }

    pub fn clear_voices(&self) {
        self.with_state(|s| s.voices.clear());
    }
}

impl AudioBackend for MockAudioBackend {
    fn open(&mut self) -> Result<(), SoundError> {
        self.with_state(|s| {
            s.open_count += 1;
            if s.unavailable {
                Err(SoundError::DeviceNotAvailable("Mock device missing".to_string()))
            } else {
                Ok(())
            }
        })
    }

    fn is_suspended(&self) -> bool {
        self.with_state(|s| s.suspended)
    }

    fn resume(&mut self) -> Result<(), SoundError> {
        self.with_state(|s| {
            if s.resume_fails {
                return Err(SoundError::ResumeFailed("Mock resume denied".to_string()));
            }
            s.resume_count += 1;
            s.suspended = false;
            Ok(())
        })
    }

    fn schedule(&mut self, voice: ScheduledVoice) -> Result<(), SoundError> {
        if self.with_state(|s| s.should_fail) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        let recorded = RecordedVoice {
            kind: voice.kind,
            frequency: voice.frequency,
            peak: voice.peak,
            offset: voice.offset,
            duration: voice.duration,
            samples: voice.source.collect(),
        };
        self.with_state(|s| s.voices.push(recorded));
        Ok(())
    }
}
