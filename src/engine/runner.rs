//! Countdown engine task.
//!
//! This module drives a [`Countdown`] from a tokio task:
//! - Commands arrive over an unbounded channel and are answered via oneshot
//! - A `tokio::time::interval` fires `tick()` once per period while running
//! - Every state change is published as a [`CountdownEvent`]
//!
//! Commands and ticks are handled by the same `select!` loop, so ticks are
//! strictly serialized and a pause or reset stops further ticks immediately.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use crate::types::{SoundRequest, SoundSettings, TimerSnapshot, TimerStatus};

use super::countdown::{Countdown, TickOutcome};
use super::error::CountdownError;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// CountdownEvent
// ============================================================================

/// Events published by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownEvent {
    /// Countdown started from idle
    Started {
        /// Seconds on the clock
        remaining_seconds: u32,
    },
    /// Countdown resumed from pause
    Resumed {
        /// Seconds on the clock
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Seconds on the clock
        remaining_seconds: u32,
    },
    /// Countdown reset to its initial duration
    Reset {
        /// Seconds on the clock
        remaining_seconds: u32,
    },
    /// A new duration was set
    DurationChanged {
        /// New duration
        seconds: u32,
    },
    /// One second elapsed
    Tick {
        /// Seconds left after the tick
        remaining_seconds: u32,
        /// Tick sound, `None` when muted
        request: Option<SoundRequest>,
    },
    /// Countdown reached zero
    Finished {
        /// Alarm sound, `None` when muted
        request: Option<SoundRequest>,
    },
}

impl CountdownEvent {
    /// Returns the sound request carried by this event, if any.
    pub fn request(&self) -> Option<SoundRequest> {
        match self {
            CountdownEvent::Tick { request, .. } | CountdownEvent::Finished { request } => {
                *request
            }
            _ => None,
        }
    }
}

// ============================================================================
// EngineCommand
// ============================================================================

type Reply<T> = oneshot::Sender<Result<T, CountdownError>>;

/// Commands accepted by the engine task.
#[derive(Debug)]
pub enum EngineCommand {
    /// Start or resume
    Start(Reply<TimerSnapshot>),
    /// Pause a running countdown
    Pause(Reply<TimerSnapshot>),
    /// Pause when running, start otherwise
    Toggle(Reply<TimerSnapshot>),
    /// Reset to the initial duration
    Reset(Reply<TimerSnapshot>),
    /// Set a new duration (refused while running)
    SetDuration(u32, Reply<TimerSnapshot>),
    /// Replace the sound settings
    SetSound(SoundSettings, Reply<TimerSnapshot>),
    /// Read the current snapshot
    Snapshot(oneshot::Sender<TimerSnapshot>),
    /// Stop the engine task
    Shutdown,
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// Engine that owns a countdown and publishes its events.
pub struct CountdownEngine {
    countdown: Countdown,
    event_tx: mpsc::UnboundedSender<CountdownEvent>,
    period: Duration,
}

impl CountdownEngine {
    /// Creates an engine around `countdown` with a one-second period.
    pub fn new(countdown: Countdown, event_tx: mpsc::UnboundedSender<CountdownEvent>) -> Self {
        Self {
            countdown,
            event_tx,
            period: TICK_PERIOD,
        }
    }

    /// Sets the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Spawns the engine on the current runtime and returns a handle to it.
    pub fn spawn(self) -> (EngineHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(command_rx));
        (EngineHandle { command_tx }, task)
    }

    /// Runs the engine loop until shutdown or until every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<EngineCommand>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.countdown.is_running() {
                        self.handle_tick();
                    }
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if matches!(command, EngineCommand::Shutdown) {
                        break;
                    }
                    if self.handle_command(command) {
                        // A fresh start waits a full period for its first tick.
                        ticker.reset();
                    }
                }
            }
        }

        debug!("Countdown engine stopped");
    }

    /// Applies a command and answers it. Returns true if counting (re)started.
    fn handle_command(&mut self, command: EngineCommand) -> bool {
        let was_running = self.countdown.is_running();

        match command {
            EngineCommand::Start(reply) => {
                let _ = reply.send(self.start().map(|()| self.snapshot()));
            }
            EngineCommand::Pause(reply) => {
                let _ = reply.send(self.pause().map(|()| self.snapshot()));
            }
            EngineCommand::Toggle(reply) => {
                let result = if was_running {
                    self.pause()
                } else {
                    self.start()
                };
                let _ = reply.send(result.map(|()| self.snapshot()));
            }
            EngineCommand::Reset(reply) => {
                self.reset();
                let _ = reply.send(Ok(self.snapshot()));
            }
            EngineCommand::SetDuration(seconds, reply) => {
                let _ = reply.send(self.set_duration(seconds).map(|()| self.snapshot()));
            }
            EngineCommand::SetSound(sound, reply) => {
                self.countdown.set_sound(sound);
                let _ = reply.send(Ok(self.snapshot()));
            }
            EngineCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            EngineCommand::Shutdown => {}
        }

        !was_running && self.countdown.is_running()
    }

    /// Advances the countdown by one second and publishes the result.
    pub fn handle_tick(&mut self) {
        match self.countdown.tick() {
            TickOutcome::Ticked {
                remaining_seconds,
                request,
            } => self.emit(CountdownEvent::Tick {
                remaining_seconds,
                request,
            }),
            TickOutcome::Finished { request } => {
                debug!("Countdown finished");
                self.emit(CountdownEvent::Finished { request });
            }
            TickOutcome::Ignored => {}
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown is already running or finished.
    pub fn start(&mut self) -> Result<(), CountdownError> {
        let previous = self.countdown.status();
        if !self.countdown.start() {
            return Err(match previous {
                TimerStatus::Finished => CountdownError::AlreadyFinished,
                _ => CountdownError::AlreadyRunning,
            });
        }

        let remaining_seconds = self.countdown.remaining_seconds();
        if previous == TimerStatus::Paused {
            self.emit(CountdownEvent::Resumed { remaining_seconds });
        } else {
            self.emit(CountdownEvent::Started { remaining_seconds });
        }
        Ok(())
    }

    /// Pauses the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown is not running.
    pub fn pause(&mut self) -> Result<(), CountdownError> {
        if !self.countdown.pause() {
            return Err(CountdownError::NotRunning);
        }
        self.emit(CountdownEvent::Paused {
            remaining_seconds: self.countdown.remaining_seconds(),
        });
        Ok(())
    }

    /// Resets the countdown to its initial duration.
    pub fn reset(&mut self) {
        self.countdown.reset();
        self.emit(CountdownEvent::Reset {
            remaining_seconds: self.countdown.remaining_seconds(),
        });
    }

    /// Sets a new duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the countdown is running.
    pub fn set_duration(&mut self, seconds: u32) -> Result<(), CountdownError> {
        if self.countdown.is_running() {
            return Err(CountdownError::ChangeWhileRunning);
        }
        self.countdown.set_duration(seconds);
        self.emit(CountdownEvent::DurationChanged { seconds });
        Ok(())
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.countdown.snapshot()
    }

    /// Returns a reference to the countdown.
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    fn emit(&self, event: CountdownEvent) {
        // Nobody listening is not an error for the countdown itself.
        if self.event_tx.send(event).is_err() {
            debug!("Countdown event dropped, no receiver");
        }
    }
}

// ============================================================================
// EngineHandle
// ============================================================================

/// Cloneable handle for sending commands to a spawned engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    async fn request(
        &self,
        command: impl FnOnce(Reply<TimerSnapshot>) -> EngineCommand,
    ) -> Result<TimerSnapshot, CountdownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .map_err(|_| CountdownError::EngineStopped)?;
        reply_rx.await.map_err(|_| CountdownError::EngineStopped)?
    }

    /// Starts or resumes the countdown.
    pub async fn start(&self) -> Result<TimerSnapshot, CountdownError> {
        self.request(EngineCommand::Start).await
    }

    /// Pauses the countdown.
    pub async fn pause(&self) -> Result<TimerSnapshot, CountdownError> {
        self.request(EngineCommand::Pause).await
    }

    /// Pauses when running, starts otherwise.
    pub async fn toggle(&self) -> Result<TimerSnapshot, CountdownError> {
        self.request(EngineCommand::Toggle).await
    }

    /// Resets the countdown.
    pub async fn reset(&self) -> Result<TimerSnapshot, CountdownError> {
        self.request(EngineCommand::Reset).await
    }

    /// Sets a new duration.
    pub async fn set_duration(&self, seconds: u32) -> Result<TimerSnapshot, CountdownError> {
        self.request(|reply| EngineCommand::SetDuration(seconds, reply))
            .await
    }

    /// Replaces the sound settings.
    pub async fn set_sound(&self, sound: SoundSettings) -> Result<TimerSnapshot, CountdownError> {
        self.request(|reply| EngineCommand::SetSound(sound, reply))
            .await
    }

    /// Reads the current snapshot.
    pub async fn snapshot(&self) -> Result<TimerSnapshot, CountdownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(EngineCommand::Snapshot(reply_tx))
            .map_err(|_| CountdownError::EngineStopped)?;
        reply_rx.await.map_err(|_| CountdownError::EngineStopped)
    }

    /// Asks the engine task to stop.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(EngineCommand::Shutdown);
    }
}

// ============================================================================
// Tests
// ============================================================================
