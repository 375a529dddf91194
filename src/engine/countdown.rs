//! Countdown state machine.
//!
//! Tracks remaining time and status, and turns each elapsed second into a
//! tick or alarm [`SoundRequest`]. The state machine has no notion of wall
//! time or audio; the caller drives [`Countdown::tick`] once per second while
//! running and decides what to do with the returned request.

use crate::types::{
    SoundRequest, SoundSettings, TimerSnapshot, TimerStatus, DEFAULT_DURATION_SECONDS,
    EMPHASIS_THRESHOLD_SECONDS,
};

// ============================================================================
// TickOutcome
// ============================================================================

/// Result of a single [`Countdown::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// One second elapsed; the countdown keeps running.
    Ticked {
        /// Seconds left after the decrement
        remaining_seconds: u32,
        /// Tick sound to play, `None` when muted
        request: Option<SoundRequest>,
    },
    /// The countdown reached zero.
    Finished {
        /// Alarm sound to play, `None` when muted
        request: Option<SoundRequest>,
    },
    /// The countdown was not running; nothing changed.
    Ignored,
}

impl TickOutcome {
    /// Returns the sound request carried by this outcome, if any.
    pub fn request(&self) -> Option<SoundRequest> {
        match self {
            TickOutcome::Ticked { request, .. } | TickOutcome::Finished { request } => *request,
            TickOutcome::Ignored => None,
        }
    }

    /// Returns true if this tick finished the countdown.
    pub fn is_finished(&self) -> bool {
        matches!(self, TickOutcome::Finished { .. })
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// A single countdown session.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining_seconds: u32,
    initial_duration_seconds: u32,
    status: TimerStatus,
    sound: SoundSettings,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECONDS)
    }
}

impl Countdown {
    /// Creates an idle countdown of `seconds`.
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining_seconds: seconds,
            initial_duration_seconds: seconds,
            status: TimerStatus::Idle,
            sound: SoundSettings::default(),
        }
    }

    /// Replaces the sound settings used for future requests.
    pub fn with_sound(mut self, sound: SoundSettings) -> Self {
        self.sound = sound;
        self
    }

    /// Starts or resumes counting.
    ///
    /// Returns false (and changes nothing) when already running or finished.
    pub fn start(&mut self) -> bool {
        if !self.status.can_start() {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    /// Pauses a running countdown, keeping the remaining time.
    ///
    /// Returns false (and changes nothing) when not running.
    pub fn pause(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    /// Pauses when running, starts otherwise.
    ///
    /// Returns the status after the toggle.
    pub fn toggle(&mut self) -> TimerStatus {
        if !self.pause() {
            self.start();
        }
        self.status
    }

    /// Returns to idle with the full initial duration.
    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining_seconds = self.initial_duration_seconds;
    }

    /// Sets a new duration and returns to idle.
    ///
    /// Callers are expected not to do this while running; it is not refused.
    pub fn set_duration(&mut self, seconds: u32) {
        self.initial_duration_seconds = seconds;
        self.remaining_seconds = seconds;
        self.status = TimerStatus::Idle;
    }

    /// Advances the countdown by one second.
    ///
    /// With one second or less left the countdown finishes and requests the
    /// alarm; otherwise it requests a tick (emphasized in the final stretch)
    /// and decrements. Ticking a countdown that is not running is ignored.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != TimerStatus::Running {
            return TickOutcome::Ignored;
        }

        let volume = self.sound.request_volume();

        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.status = TimerStatus::Finished;
            return TickOutcome::Finished {
                request: volume.map(|volume| SoundRequest::Alarm { volume }),
            };
        }

        let request = volume.map(|volume| SoundRequest::Tick {
            volume,
            emphasized: self.remaining_seconds <= EMPHASIS_THRESHOLD_SECONDS,
        });
        self.remaining_seconds -= 1;

        TickOutcome::Ticked {
            remaining_seconds: self.remaining_seconds,
            request,
        }
    }

    /// Returns a read-only snapshot for rendering.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.remaining_seconds,
            initial_duration_seconds: self.initial_duration_seconds,
            status: self.status,
        }
    }

    /// Returns the current status.
    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Returns the remaining seconds.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns the duration the countdown resets to.
    pub fn initial_duration_seconds(&self) -> u32 {
        self.initial_duration_seconds
    }

    /// Returns true while counting down.
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Returns the current sound settings.
    pub fn sound(&self) -> SoundSettings {
        self.sound
    }

    /// Replaces the sound settings used for future requests.
    pub fn set_sound(&mut self, sound: SoundSettings) {
        self.sound = sound;
    }
}

// ============================================================================
// Tests
// ============================================================================
