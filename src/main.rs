//! ticktock - A countdown timer with synthesized sounds
//!
//! Counts down from a chosen duration:
//! - A tick and a tock alternate every second
//! - The last ten seconds tick at a higher pitch
//! - An alarm plays when the countdown reaches zero

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tracing::debug;

use ticktock::cli::{
    spawn_stdin_reader, Cli, Commands, Display, RunArgs, Session, SoundArgs, SoundKind,
};
use ticktock::engine::{Countdown, CountdownEngine};
use ticktock::sound::{
    ContextState, RodioBackend, Timbre, ToneSynthesizer, ALARM_DURATION, TICK_DURATION,
};
use ticktock::types::{SoundSettings, TimerConfig};

/// Extra time the sound command keeps the output open after a sound ends.
const PLAYBACK_TAIL: Duration = Duration::from_millis(150);

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so they never mix with the countdown line.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            let config = TimerConfig::load(cli.config.as_deref())?;
            run_session(config, args).await?;
        }
        Some(Commands::Presets) => {
            let config = TimerConfig::load(cli.config.as_deref())?;
            Display::show_presets(&config.presets);
        }
        Some(Commands::Sound(args)) => {
            let config = TimerConfig::load(cli.config.as_deref())?;
            play_sound(&config, &args).await?;
        }
        Some(Commands::Config) => {
            let config = TimerConfig::load(cli.config.as_deref())?;
            let path = cli.config.clone().or_else(TimerConfig::default_path);
            Display::show_config(&config, path.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Applies command-line overrides to the loaded configuration.
fn apply_overrides(mut config: TimerConfig, args: &RunArgs) -> TimerConfig {
    if let Some(seconds) = args.duration {
        config = config.with_duration(seconds);
    }
    if let Some(volume) = args.volume {
        config = config.with_volume(volume);
    }
    if args.mute {
        config = config.with_sound_enabled(false);
    }
    config
}

/// Runs an interactive session on the default audio output.
async fn run_session(config: TimerConfig, args: RunArgs) -> Result<()> {
    let config = apply_overrides(config, &args);
    let sound = SoundSettings::from_config(&config);
    debug!(?config, "Starting session");

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let countdown = Countdown::new(config.default_duration_seconds).with_sound(sound);
    let (engine, task) = CountdownEngine::new(countdown, event_tx).spawn();

    let synth = ToneSynthesizer::new(RodioBackend::new()).with_sample_rate(config.sample_rate);
    let session = Session::new(engine, event_rx, synth, sound)
        .with_presets(config.presets)
        .with_autostart(args.start)
        .with_exit_on_finish(args.exit_on_finish);

    let snapshot = session.run(spawn_stdin_reader()).await?;
    task.await?;

    debug!(
        status = snapshot.status.as_str(),
        remaining = snapshot.remaining_seconds,
        "Session ended"
    );
    Ok(())
}

/// Plays one sound and waits for it to finish.
async fn play_sound(config: &TimerConfig, args: &SoundArgs) -> Result<()> {
    let volume = args.volume.unwrap_or(config.volume);
    let mut synth =
        ToneSynthesizer::new(RodioBackend::new()).with_sample_rate(config.sample_rate);

    let length = match args.kind {
        SoundKind::Tick | SoundKind::Tock => {
            let timbre = if args.kind == SoundKind::Tock {
                Timbre::Tock
            } else {
                Timbre::Tick
            };
            synth.set_next_timbre(timbre);
            synth.emit_tick(volume, args.emphasized)?;
            TICK_DURATION
        }
        SoundKind::Alarm => {
            synth.emit_alarm(volume)?;
            ALARM_DURATION
        }
    };

    if synth.context_state() == ContextState::Unavailable {
        bail!("オーディオデバイスが見つかりません");
    }

    // The output stream must outlive the detached voices.
    tokio::time::sleep(length + PLAYBACK_TAIL).await;
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
