//! One-shot synthesized voices.
//!
//! A voice is a short mono [`rodio::Source`] that renders a fixed number of
//! samples and then ends. Voices are built per call and never reused; the
//! output plays them detached, so overlapping voices are normal.

use std::f32::consts::TAU;
use std::time::Duration;

use rodio::Source;

use super::filter::HighPassFilter;

/// Exponential ramps cannot reach zero; envelopes decay toward this instead.
pub const ENVELOPE_FLOOR: f32 = 0.0001;

/// Number of samples covering `duration` at `sample_rate`.
pub fn sample_count(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

// ============================================================================
// ExponentialRamp
// ============================================================================

/// A value moving multiplicatively from `start` to `end` over `len` samples.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialRamp {
    start: f32,
    ratio: f32,
    len: usize,
}

impl ExponentialRamp {
    /// Creates a ramp. Both ends are floored at [`ENVELOPE_FLOOR`].
    pub fn new(start: f32, end: f32, len: usize) -> Self {
        let start = start.max(ENVELOPE_FLOOR);
        let end = end.max(ENVELOPE_FLOOR);
        Self {
            start,
            ratio: end / start,
            len: len.max(1),
        }
    }

    /// Creates a ramp decaying from `start` toward [`ENVELOPE_FLOOR`].
    pub fn decay(start: f32, len: usize) -> Self {
        Self::new(start, ENVELOPE_FLOOR, len)
    }

    /// Value at sample `index`; holds the end value past the ramp.
    pub fn value_at(&self, index: usize) -> f32 {
        let progress = (index as f32 / self.len as f32).min(1.0);
        self.start * self.ratio.powf(progress)
    }
}

// ============================================================================
// Generators
// ============================================================================

/// Produces the samples of a voice, one per call.
pub trait Generator: Send + 'static {
    /// Returns sample `index`. Called with consecutive indices from zero.
    fn sample(&mut self, index: usize) -> f32;
}

/// Sine oscillator whose pitch and amplitude both decay exponentially.
#[derive(Debug, Clone)]
pub struct ToneSweep {
    frequency: ExponentialRamp,
    amplitude: ExponentialRamp,
    phase: f32,
    sample_rate: f32,
}

impl ToneSweep {
    /// Sweeps from `start_hz` to `end_hz` over `len` samples, decaying from `peak`.
    pub fn new(start_hz: f32, end_hz: f32, peak: f32, len: usize, sample_rate: u32) -> Self {
        Self {
            frequency: ExponentialRamp::new(start_hz, end_hz, len),
            amplitude: ExponentialRamp::decay(peak, len),
            phase: 0.0,
            sample_rate: sample_rate as f32,
        }
    }
}

impl Generator for ToneSweep {
    fn sample(&mut self, index: usize) -> f32 {
        let out = self.phase.sin() * self.amplitude.value_at(index);
        self.phase = (self.phase + TAU * self.frequency.value_at(index) / self.sample_rate) % TAU;
        out
    }
}

/// Pre-rendered white noise through a high-pass filter and a decaying gain.
#[derive(Debug, Clone)]
pub struct NoiseBurst {
    noise: Vec<f32>,
    filter: HighPassFilter,
    amplitude: ExponentialRamp,
}

impl NoiseBurst {
    /// Filters `noise` at `cutoff_hz`, decaying from `peak` over its length.
    pub fn new(noise: Vec<f32>, cutoff_hz: f32, peak: f32, sample_rate: u32) -> Self {
        let len = noise.len();
        Self {
            noise,
            filter: HighPassFilter::new(f64::from(cutoff_hz), f64::from(sample_rate)),
            amplitude: ExponentialRamp::decay(peak, len),
        }
    }
}

impl Generator for NoiseBurst {
    fn sample(&mut self, index: usize) -> f32 {
        let raw = self.noise.get(index).copied().unwrap_or(0.0);
        self.filter.process(raw) * self.amplitude.value_at(index)
    }
}

/// Square wave at a fixed pitch with a decaying amplitude.
#[derive(Debug, Clone)]
pub struct SquareBeep {
    frequency: f32,
    amplitude: ExponentialRamp,
    sample_rate: f32,
}

impl SquareBeep {
    /// Beeps at `frequency` for `len` samples, decaying from `peak`.
    pub fn new(frequency: f32, peak: f32, len: usize, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude: ExponentialRamp::decay(peak, len),
            sample_rate: sample_rate as f32,
        }
    }
}

impl Generator for SquareBeep {
    fn sample(&mut self, index: usize) -> f32 {
        let cycles = self.frequency * index as f32 / self.sample_rate;
        let level = if cycles.fract() < 0.5 { 1.0 } else { -1.0 };
        level * self.amplitude.value_at(index)
    }
}

/// Two generators summed into one gain stage.
#[derive(Debug, Clone)]
pub struct Layered<A, B> {
    first: A,
    second: B,
    gain: f32,
}

impl<A: Generator, B: Generator> Layered<A, B> {
    /// Mixes `first` and `second` at unity gain.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            gain: 1.0,
        }
    }
}

impl<A: Generator, B: Generator> Generator for Layered<A, B> {
    fn sample(&mut self, index: usize) -> f32 {
        (self.first.sample(index) + self.second.sample(index)) * self.gain
    }
}

// ============================================================================
// OneShot
// ============================================================================

/// A generator bounded to a fixed length, playable as a mono rodio source.
#[derive(Debug, Clone)]
pub struct OneShot<G> {
    generator: G,
    sample_rate: u32,
    len: usize,
    index: usize,
}

impl<G: Generator> OneShot<G> {
    /// Plays `generator` for `len` samples.
    pub fn new(generator: G, len: usize, sample_rate: u32) -> Self {
        Self {
            generator,
            sample_rate,
            len,
            index: 0,
        }
    }

    /// Total length in samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true for a zero-length voice.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<G: Generator> Iterator for OneShot<G> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.len {
            return None;
        }
        let sample = self.generator.sample(self.index);
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.index;
        (left, Some(left))
    }
}

impl<G: Generator> Source for OneShot<G> {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.len - self.index)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.len as f64 / f64::from(self.sample_rate),
        ))
    }
}

// ============================================================================
// ScheduledVoice
// ============================================================================

/// What a scheduled voice is, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceKind {
    /// Higher tick timbre
    Tick,
    /// Lower tock timbre
    Tock,
    /// One of the short alarm beeps
    AlarmBeep,
    /// The long closing alarm beep
    AlarmFinal,
}

/// A voice ready to hand to the output, with its start offset.
pub struct ScheduledVoice {
    /// What this voice is
    pub kind: VoiceKind,
    /// Start frequency in Hz
    pub frequency: f32,
    /// Peak amplitude of the loudest layer
    pub peak: f32,
    /// Delay from the scheduling call to the start of the voice
    pub offset: Duration,
    /// Playing length
    pub duration: Duration,
    /// The samples
    pub source: Box<dyn Source<Item = f32> + Send>,
}

impl std::fmt::Debug for ScheduledVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledVoice")
            .field("kind", &self.kind)
            .field("frequency", &self.frequency)
            .field("peak", &self.peak)
            .field("offset", &self.offset)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
