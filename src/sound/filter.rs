//! Second-order high-pass filter used to shape the tick noise.
//!
//! Coefficients follow the Audio EQ Cookbook; the resonance is given in dB
//! the same way browser biquad nodes take their Q.

use std::f64::consts::PI;

/// Resonance applied when none is given, in dB.
pub const DEFAULT_RESONANCE_DB: f64 = 1.0;

/// A biquad high-pass filter (Direct Form II Transposed).
#[derive(Debug, Clone)]
pub struct HighPassFilter {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,
}

impl HighPassFilter {
    /// Creates a filter with the default resonance.
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::with_resonance(cutoff_hz, DEFAULT_RESONANCE_DB, sample_rate)
    }

    /// Creates a filter with an explicit resonance in dB.
    pub fn with_resonance(cutoff_hz: f64, resonance_db: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let q = 10.0_f64.powf(resonance_db / 20.0);
        let alpha = w0.sin() / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = b0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Processes one sample.
    pub fn process(&mut self, input: f32) -> f32 {
        let input = f64::from(input);
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output as f32
    }

    /// Clears the filter memory.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}
