//! CLI module for ticktock.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Duration coercion and session command parsing
//! - `display`: Output formatting and display logic
//! - `session`: Interactive countdown session

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

pub use commands::{Cli, Commands, RunArgs, SoundArgs, SoundKind};
pub use display::Display;
pub use input::{parse_duration_input, SessionCommand};
pub use session::{spawn_stdin_reader, Flow, Session};
