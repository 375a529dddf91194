//! Tick and alarm synthesizer.
//!
//! Every sound is built from primitives at call time:
//!
//! - **tick / tock**: a sine sweep falling toward 100 Hz layered with a burst
//!   of high-passed white noise, both 30 ms long. Successive ticks alternate
//!   between the higher "tick" and the lower "tock" timbre.
//! - **alarm**: three 880 Hz square beeps 0.2 s apart, then a long 1760 Hz
//!   beep.
//!
//! Volumes of zero or below are no-ops. Use [`ToneSynthesizer::prime`] to
//! open the output without making a sound.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::types::{SoundRequest, DEFAULT_SAMPLE_RATE};

use super::context::{AudioContext, ContextState};
use super::error::SoundError;
use super::voice::{
    sample_count, Layered, NoiseBurst, OneShot, ScheduledVoice, SquareBeep, ToneSweep, VoiceKind,
};
use super::AudioBackend;

/// Length of a tick voice.
pub const TICK_DURATION: Duration = Duration::from_millis(30);

/// Frequency the tick sweep falls toward.
pub const SWEEP_TARGET_HZ: f32 = 100.0;

/// Pitch multiplier for emphasized ticks.
pub const EMPHASIS_PITCH_FACTOR: f32 = 1.3;

/// Share of the volume given to the tone layer of a tick.
pub const TONE_WEIGHT: f32 = 0.3;

/// Share of the volume given to the noise layer of a tick.
pub const NOISE_WEIGHT: f32 = 0.4;

/// Share of the volume given to each alarm beep.
pub const ALARM_WEIGHT: f32 = 0.5;

/// Short alarm beeps as (offset, frequency, length).
const ALARM_BEEPS: [(Duration, f32, Duration); 3] = [
    (Duration::from_millis(0), 880.0, Duration::from_millis(400)),
    (Duration::from_millis(200), 880.0, Duration::from_millis(400)),
    (Duration::from_millis(400), 880.0, Duration::from_millis(400)),
];

/// Closing alarm beep as (offset, frequency, length).
const ALARM_FINAL: (Duration, f32, Duration) =
    (Duration::from_millis(600), 1760.0, Duration::from_millis(1500));

/// Time from the start of the alarm until its last beep has ended.
pub const ALARM_DURATION: Duration = Duration::from_millis(2100);

// ============================================================================
// Timbre
// ============================================================================

/// The two alternating tick timbres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timbre {
    /// Higher pitch, sharper noise
    Tick,
    /// Lower pitch, duller noise
    Tock,
}

impl Timbre {
    /// Sweep start frequency before emphasis.
    pub fn base_frequency(&self) -> f32 {
        match self {
            Timbre::Tick => 1200.0,
            Timbre::Tock => 900.0,
        }
    }

    /// High-pass cutoff of the noise layer.
    pub fn noise_cutoff(&self) -> f32 {
        match self {
            Timbre::Tick => 3000.0,
            Timbre::Tock => 2000.0,
        }
    }

    fn kind(&self) -> VoiceKind {
        match self {
            Timbre::Tick => VoiceKind::Tick,
            Timbre::Tock => VoiceKind::Tock,
        }
    }
}

// ============================================================================
// ToneSynthesizer
// ============================================================================

/// Synthesizes ticks and alarms onto an audio backend.
#[derive(Debug)]
pub struct ToneSynthesizer<B> {
    context: AudioContext<B>,
    sample_rate: u32,
    last_tick_was_high: bool,
    rng: StdRng,
}

impl<B: AudioBackend> ToneSynthesizer<B> {
    /// Creates a synthesizer; the backend is not opened until first use.
    pub fn new(backend: B) -> Self {
        Self {
            context: AudioContext::new(backend),
            sample_rate: DEFAULT_SAMPLE_RATE,
            last_tick_was_high: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Sets the synthesis sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Seeds the noise generator, for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Initializes and resumes the audio output without producing sound.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::ResumeFailed` if the output could not be resumed.
    /// A missing device is not an error.
    pub fn prime(&mut self) -> Result<(), SoundError> {
        self.context.ensure_ready().map(|_| ())
    }

    /// Plays a request from the countdown.
    ///
    /// # Errors
    ///
    /// See [`ToneSynthesizer::emit_tick`] and [`ToneSynthesizer::emit_alarm`].
    pub fn emit(&mut self, request: SoundRequest) -> Result<(), SoundError> {
        match request {
            SoundRequest::Tick { volume, emphasized } => self.emit_tick(volume, emphasized),
            SoundRequest::Alarm { volume } => self.emit_alarm(volume),
        }
    }

    /// Plays one tick, alternating tick and tock timbres between calls.
    ///
    /// Does nothing for `volume <= 0`, and does not advance the alternation
    /// when nothing was synthesized.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be resumed or refused the voice.
    pub fn emit_tick(&mut self, volume: f32, emphasized: bool) -> Result<(), SoundError> {
        if volume <= 0.0 {
            return Ok(());
        }
        if !self.context.ensure_ready()? {
            return Ok(());
        }

        let timbre = self.next_timbre();
        self.last_tick_was_high = !self.last_tick_was_high;

        let voice = self.tick_voice(timbre, volume, emphasized);
        debug!(?timbre, emphasized, "Emitting tick");
        self.context.schedule(voice)
    }

    /// Plays the alarm: three short beeps and one long beep.
    ///
    /// Does nothing for `volume <= 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be resumed or refused a beep.
    /// Beeps after a refused one are not scheduled.
    pub fn emit_alarm(&mut self, volume: f32) -> Result<(), SoundError> {
        if volume <= 0.0 {
            return Ok(());
        }
        if !self.context.ensure_ready()? {
            return Ok(());
        }

        debug!("Emitting alarm");
        let peak = volume * ALARM_WEIGHT;
        for (offset, frequency, length) in ALARM_BEEPS {
            let voice = self.beep_voice(VoiceKind::AlarmBeep, offset, frequency, length, peak);
            self.context.schedule(voice)?;
        }
        let (offset, frequency, length) = ALARM_FINAL;
        let voice = self.beep_voice(VoiceKind::AlarmFinal, offset, frequency, length, peak);
        self.context.schedule(voice)
    }

    /// Timbre the next audible tick will use.
    pub fn next_timbre(&self) -> Timbre {
        if self.last_tick_was_high {
            Timbre::Tock
        } else {
            Timbre::Tick
        }
    }

    /// Makes the next tick a high "tick" again.
    pub fn reset_alternation(&mut self) {
        self.last_tick_was_high = false;
    }

    /// Chooses the timbre of the next audible tick.
    pub fn set_next_timbre(&mut self, timbre: Timbre) {
        self.last_tick_was_high = timbre == Timbre::Tock;
    }

    /// Returns the output context state.
    pub fn context_state(&self) -> ContextState {
        self.context.state()
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        self.context.backend()
    }

    fn tick_voice(&mut self, timbre: Timbre, volume: f32, emphasized: bool) -> ScheduledVoice {
        let len = sample_count(TICK_DURATION, self.sample_rate);
        let frequency = if emphasized {
            timbre.base_frequency() * EMPHASIS_PITCH_FACTOR
        } else {
            timbre.base_frequency()
        };

        let tone_peak = volume * TONE_WEIGHT;
        let noise_peak = volume * NOISE_WEIGHT;
        let noise: Vec<f32> = (0..len).map(|_| self.rng.gen_range(-1.0..=1.0)).collect();

        let layered = Layered::new(
            ToneSweep::new(frequency, SWEEP_TARGET_HZ, tone_peak, len, self.sample_rate),
            NoiseBurst::new(noise, timbre.noise_cutoff(), noise_peak, self.sample_rate),
        );

        ScheduledVoice {
            kind: timbre.kind(),
            frequency,
            peak: tone_peak.max(noise_peak),
            offset: Duration::ZERO,
            duration: TICK_DURATION,
            source: Box::new(OneShot::new(layered, len, self.sample_rate)),
        }
    }

    fn beep_voice(
        &self,
        kind: VoiceKind,
        offset: Duration,
        frequency: f32,
        length: Duration,
        peak: f32,
    ) -> ScheduledVoice {
        let len = sample_count(length, self.sample_rate);
        ScheduledVoice {
            kind,
            frequency,
            peak,
            offset,
            duration: length,
            source: Box::new(OneShot::new(
                SquareBeep::new(frequency, peak, len, self.sample_rate),
                len,
                self.sample_rate,
            )),
        }
    }
}
