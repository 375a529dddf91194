//! ticktock Library
//!
//! This library provides the core functionality for the ticktock CLI.
//! It includes:
//! - A countdown state machine and the tokio task that drives it
//! - A procedural tick/tock and alarm synthesizer on top of rodio
//! - CLI command parsing, the interactive session and display utilities
//! - Type definitions for configuration and state

pub mod cli;
pub mod engine;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_time, ConfigError, SoundRequest, SoundSettings, TimerConfig, TimerSnapshot, TimerStatus,
};

// Re-export engine types
pub use engine::{
    Countdown, CountdownEngine, CountdownError, CountdownEvent, EngineHandle, TickOutcome,
};

// Re-export sound types
pub use sound::{
    AudioBackend, MockAudioBackend, RodioBackend, SoundError, ToneSynthesizer,
};
