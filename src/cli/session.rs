//! Interactive countdown session.
//!
//! The session is the boundary between the countdown engine and the
//! outside world. It owns the synthesizer, since the audio output stays on
//! the thread that opened it, and reads commands one line at a time.
//!
//! ```text
//! stdin lines ──▶ SessionCommand ──▶ EngineHandle ──▶ engine task
//!                                                        │
//! terminal ◀── Display ◀── CountdownEvent ◀──────────────┘
//!                              │
//!                              └─▶ ToneSynthesizer (requests)
//! ```

use std::io::BufRead;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{CountdownError, CountdownEvent, EngineHandle};
use crate::sound::{AudioBackend, ToneSynthesizer};
use crate::types::{SoundRequest, SoundSettings, TimerSnapshot, TimerStatus, DURATION_PRESETS};

use super::display::Display;
use super::input::SessionCommand;

/// Whether the session keeps going after handling something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An interactive countdown session.
pub struct Session<B: AudioBackend> {
    engine: EngineHandle,
    events: mpsc::UnboundedReceiver<CountdownEvent>,
    synth: ToneSynthesizer<B>,
    sound: SoundSettings,
    presets: Vec<u32>,
    autostart: bool,
    exit_on_finish: bool,
    input_open: bool,
}

impl<B: AudioBackend> Session<B> {
    /// Creates a session over a spawned engine and its event stream.
    ///
    /// `sound` must match the settings the engine's countdown was built with.
    pub fn new(
        engine: EngineHandle,
        events: mpsc::UnboundedReceiver<CountdownEvent>,
        synth: ToneSynthesizer<B>,
        sound: SoundSettings,
    ) -> Self {
        Self {
            engine,
            events,
            synth,
            sound,
            presets: DURATION_PRESETS.to_vec(),
            autostart: false,
            exit_on_finish: false,
            input_open: true,
        }
    }

    /// Sets the presets listed by the `l` command.
    pub fn with_presets(mut self, presets: Vec<u32>) -> Self {
        self.presets = presets;
        self
    }

    /// Starts counting as soon as the session runs.
    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Ends the session when the countdown finishes.
    pub fn with_exit_on_finish(mut self, exit_on_finish: bool) -> Self {
        self.exit_on_finish = exit_on_finish;
        self
    }

    /// Runs until quit, Ctrl-C, or until input ends with nothing left to do.
    ///
    /// Returns the last snapshot of the countdown. The engine is shut down
    /// on return.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine stops.
    pub async fn run(
        mut self,
        mut lines: mpsc::UnboundedReceiver<String>,
    ) -> Result<TimerSnapshot> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let snapshot = self.engine.snapshot().await?;
        Display::show_welcome(&snapshot);
        Display::show_status(&snapshot, &self.sound);

        if self.autostart {
            self.handle_command(SessionCommand::Toggle).await?;
        }

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    if self.handle_event(event).await? == Flow::Quit {
                        break;
                    }
                }
                line = lines.recv(), if self.input_open => {
                    match line {
                        Some(line) => {
                            let command = SessionCommand::parse(&line);
                            if self.handle_command(command).await? == Flow::Quit {
                                break;
                            }
                        }
                        None => {
                            debug!("Input closed");
                            self.input_open = false;
                            if self.engine.snapshot().await?.status != TimerStatus::Running {
                                break;
                            }
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    debug!("Interrupted");
                    break;
                }
            }
        }

        let snapshot = self.engine.snapshot().await?;
        self.engine.shutdown();
        println!();
        Ok(snapshot)
    }

    /// Reacts to an engine event: plays its sound and updates the screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine stopped.
    pub async fn handle_event(&mut self, event: CountdownEvent) -> Result<Flow> {
        if let Some(request) = event.request() {
            self.play(request);
        }

        let snapshot = self.engine.snapshot().await?;
        let mut flow = Flow::Continue;
        match event {
            CountdownEvent::Tick { .. } => {}
            CountdownEvent::Finished { .. } => {
                Display::show_finished();
                if self.exit_on_finish || !self.input_open {
                    flow = Flow::Quit;
                }
            }
            CountdownEvent::DurationChanged { seconds } => Display::show_duration(seconds),
            CountdownEvent::Started { .. }
            | CountdownEvent::Resumed { .. }
            | CountdownEvent::Paused { .. }
            | CountdownEvent::Reset { .. } => Display::show_transition(&snapshot),
        }
        Display::show_status(&snapshot, &self.sound);
        Ok(flow)
    }

    /// Applies one typed command.
    ///
    /// Refused engine commands are reported and the session continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine stopped.
    pub async fn handle_command(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::Toggle => {
                let snapshot = self.engine.snapshot().await?;
                if snapshot.status.can_start() {
                    // Opening the output here keeps the first tick on time.
                    if let Err(e) = self.synth.prime() {
                        warn!("Failed to prepare audio output: {}", e);
                    }
                }
                report(self.engine.toggle().await)?;
            }
            SessionCommand::Reset => {
                report(self.engine.reset().await)?;
            }
            SessionCommand::SetDuration(seconds) => {
                report(self.engine.set_duration(seconds).await)?;
            }
            SessionCommand::ToggleMute => {
                self.sound.toggle();
                self.apply_sound().await?;
            }
            SessionCommand::SetVolume(volume) => {
                self.sound.set_volume(volume);
                self.apply_sound().await?;
            }
            SessionCommand::Presets => Display::show_presets(&self.presets),
            SessionCommand::Help => Display::show_help(),
            SessionCommand::Quit => return Ok(Flow::Quit),
            SessionCommand::Unknown(input) => Display::show_unknown(&input),
        }
        Ok(Flow::Continue)
    }

    /// Returns the current sound settings.
    pub fn sound(&self) -> SoundSettings {
        self.sound
    }

    /// Returns the synthesizer.
    pub fn synth(&self) -> &ToneSynthesizer<B> {
        &self.synth
    }

    async fn apply_sound(&mut self) -> Result<()> {
        report(self.engine.set_sound(self.sound).await)?;
        Display::show_sound(&self.sound);
        Ok(())
    }

    fn play(&mut self, request: SoundRequest) {
        if let Err(e) = self.synth.emit(request) {
            warn!("Sound playback failed: {}", e);
            if e.is_transient() {
                debug!("Audio output will be retried on the next sound");
            } else {
                debug!("{}", e.suggestion());
            }
        }
    }
}

/// Reads stdin lines on a dedicated thread.
///
/// The channel closes at end of input. The thread is not joined; a read
/// blocked on the terminal ends with the process.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Shows a refused command to the user; only a stopped engine is fatal.
fn report(result: Result<TimerSnapshot, CountdownError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(CountdownError::EngineStopped) => Err(CountdownError::EngineStopped.into()),
        Err(e) => {
            Display::show_error(&e.to_string());
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Countdown, CountdownEngine};
    use crate::sound::{MockAudioBackend, VoiceKind};
    use std::time::Duration;

    const PERIOD: Duration = Duration::from_millis(20);

    fn session(seconds: u32, sound: SoundSettings) -> (Session<MockAudioBackend>, MockAudioBackend) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let countdown = Countdown::new(seconds).with_sound(sound);
        let (handle, _task) = CountdownEngine::new(countdown, event_tx)
            .with_period(PERIOD)
            .spawn();
        let mock = MockAudioBackend::new();
        let synth = ToneSynthesizer::new(mock.clone()).with_seed(1);
        (Session::new(handle, event_rx, synth, sound), mock)
    }

    /// Queues `lines` and closes the input.
    fn input(lines: &[&str]) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send((*line).to_string()).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_quit_before_start() {
        let (session, mock) = session(60, SoundSettings::default());
        let snapshot = session.run(input(&["q"])).await.unwrap();

        assert_eq!(snapshot.status, TimerStatus::Idle);
        assert_eq!(snapshot.remaining_seconds, 60);
        assert_eq!(mock.open_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_input_ends_idle_session() {
        let (session, _mock) = session(60, SoundSettings::default());
        let snapshot = session.run(input(&[])).await.unwrap();
        assert_eq!(snapshot.status, TimerStatus::Idle);
    }

    #[tokio::test]
    async fn test_runs_to_alarm_after_input_closes() {
        let (session, mock) = session(60, SoundSettings::default());
        let snapshot = session.run(input(&["d 3", ""])).await.unwrap();

        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.initial_duration_seconds, 3);

        let kinds: Vec<VoiceKind> = mock.voices().iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VoiceKind::Tick,
                VoiceKind::Tock,
                VoiceKind::AlarmBeep,
                VoiceKind::AlarmBeep,
                VoiceKind::AlarmBeep,
                VoiceKind::AlarmFinal,
            ]
        );
        // Toggle from idle primed the output before the first tick.
        assert_eq!(mock.open_count(), 1);
    }

    #[tokio::test]
    async fn test_muted_session_is_silent_but_primed() {
        let (session, mock) = session(60, SoundSettings::default());
        let snapshot = session.run(input(&["m", "d 2", "s"])).await.unwrap();

        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(mock.voice_count(), 0);
        assert_eq!(mock.open_count(), 1);
    }

    #[tokio::test]
    async fn test_autostart_with_exit_on_finish() {
        let (session, mock) = session(1, SoundSettings::default());
        let session = session.with_autostart(true).with_exit_on_finish(true);

        // Input that never ends; the alarm ends the session.
        let (_tx, rx) = mpsc::unbounded_channel();
        let snapshot = session.run(rx).await.unwrap();

        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(mock.voice_count(), 4);
    }

    #[tokio::test]
    async fn test_volume_change_unmutes() {
        let mut muted = SoundSettings::default();
        muted.toggle();
        let (mut session, _mock) = session(60, muted);

        let flow = session
            .handle_command(SessionCommand::SetVolume(0.8))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(session.sound().enabled);
        assert_eq!(session.sound().volume, 0.8);
    }

    #[tokio::test]
    async fn test_refused_command_keeps_session_alive() {
        let (mut session, _mock) = session(60, SoundSettings::default());
        session.handle_command(SessionCommand::Toggle).await.unwrap();

        // Changing the duration while running is refused, not fatal.
        let flow = session
            .handle_command(SessionCommand::SetDuration(30))
            .await
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(session.engine.snapshot().await.unwrap().initial_duration_seconds, 60);
    }

    #[tokio::test]
    async fn test_unavailable_audio_does_not_stop_session() {
        let (session, mock) = session(60, SoundSettings::default());
        mock.set_available(false);

        let snapshot = session.run(input(&["d 2", ""])).await.unwrap();
        assert_eq!(snapshot.status, TimerStatus::Finished);
        assert_eq!(mock.voice_count(), 0);
    }
}
