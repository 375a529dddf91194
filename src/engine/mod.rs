//! Countdown engine.
//!
//! - `countdown`: the state machine (start/pause/reset/set_duration/tick)
//! - `runner`: tokio task driving the state machine once per period
//! - `error`: command errors

pub mod countdown;
pub mod error;
pub mod runner;

pub use countdown::{Countdown, TickOutcome};
pub use error::CountdownError;
pub use runner::{CountdownEngine, CountdownEvent, EngineCommand, EngineHandle};
