//! Command definitions for the ticktock CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::input::{parse_duration_arg, parse_volume_arg};

// ============================================================================
// CLI Structure
// ============================================================================

/// ticktock - A countdown timer with synthesized tick and alarm sounds
#[derive(Parser, Debug)]
#[command(
    name = "ticktock",
    version,
    about = "チクタク音付きカウントダウンタイマー",
    long_about = "ターミナル上で動作するカウントダウンタイマー。\n\
                  毎秒チク・タクを交互に鳴らし、残り10秒からは高い音で強調、\n\
                  0秒でアラームを鳴らします。音はすべてその場で合成されます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (defaults to the user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an interactive countdown session
    Run(RunArgs),

    /// List the duration presets
    Presets,

    /// Play a single sound to check the audio output
    Sound(SoundArgs),

    /// Show the effective configuration
    Config,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Countdown duration in seconds, or a preset label like 30s / 5m
    #[arg(short, long, value_parser = parse_duration_arg)]
    pub duration: Option<u32>,

    /// Sound volume (0.0-1.0)
    #[arg(long, value_parser = parse_volume_arg)]
    pub volume: Option<f32>,

    /// Start with sound turned off
    #[arg(short, long)]
    pub mute: bool,

    /// Start counting immediately instead of waiting for input
    #[arg(short, long)]
    pub start: bool,

    /// Leave the session once the alarm has played
    #[arg(short = 'x', long)]
    pub exit_on_finish: bool,
}

// ============================================================================
// Sound Command Arguments
// ============================================================================

/// Which sound to play
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundKind {
    /// High tick
    #[default]
    Tick,
    /// Low tock
    Tock,
    /// Alarm sequence
    Alarm,
}

/// Arguments for the sound command
#[derive(Args, Debug, Clone)]
pub struct SoundArgs {
    /// Sound to play
    #[arg(value_enum, default_value_t = SoundKind::Tick)]
    pub kind: SoundKind,

    /// Sound volume (0.0-1.0)
    #[arg(long, value_parser = parse_volume_arg)]
    pub volume: Option<f32>,

    /// Use the higher final-stretch pitch
    #[arg(short, long)]
    pub emphasized: bool,
}

// ============================================================================
// Tests
// ============================================================================
