//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - Countdown status and read-only snapshots
//! - Sound requests passed from the countdown to the synthesizer
//! - Timer configuration with validation and file loading
//! - Duration presets and time formatting

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Duration a fresh countdown starts with.
pub const DEFAULT_DURATION_SECONDS: u32 = 60;

/// Default playback volume in `[0, 1]`.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Default synthesis sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Duration presets offered to the user, in seconds.
pub const DURATION_PRESETS: [u32; 6] = [10, 30, 60, 180, 300, 600];

/// Ticks fired with this many seconds (or fewer) remaining are emphasized.
///
/// The tick fired at 11 remaining is the one that brings the display to 10.
pub const EMPHASIS_THRESHOLD_SECONDS: u32 = 11;

/// The display is urgent while running with this many seconds (or fewer) left.
pub const URGENT_THRESHOLD_SECONDS: u32 = 10;

// ============================================================================
// TimerStatus
// ============================================================================

/// Represents the current status of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// Not started, or reset
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Counting suspended, remaining time preserved
    Paused,
    /// Reached zero while running
    Finished,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Finished => "finished",
        }
    }

    /// Returns the label shown in the status badge.
    pub fn label(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "IDLE",
            TimerStatus::Running => "CHALLENGE ACTIVE",
            TimerStatus::Paused => "PAUSED",
            TimerStatus::Finished => "FINISHED",
        }
    }

    /// Returns true if `start()` is accepted from this status.
    pub fn can_start(&self) -> bool {
        matches!(self, TimerStatus::Idle | TimerStatus::Paused)
    }
}

// ============================================================================
// SoundRequest
// ============================================================================

/// A request for the synthesizer, produced by a countdown tick.
///
/// Requests are ephemeral; the boundary layer either forwards them to the
/// synthesizer or drops them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoundRequest {
    /// Per-second tick
    Tick {
        /// Playback volume
        volume: f32,
        /// Final stretch of the countdown
        emphasized: bool,
    },
    /// Countdown reached zero
    Alarm {
        /// Playback volume
        volume: f32,
    },
}

impl SoundRequest {
    /// Returns the requested volume.
    pub fn volume(&self) -> f32 {
        match self {
            SoundRequest::Tick { volume, .. } | SoundRequest::Alarm { volume } => *volume,
        }
    }

    /// Returns true for the alarm request.
    pub fn is_alarm(&self) -> bool {
        matches!(self, SoundRequest::Alarm { .. })
    }

    /// Returns true for an emphasized tick.
    pub fn is_emphasized(&self) -> bool {
        matches!(
            self,
            SoundRequest::Tick {
                emphasized: true,
                ..
            }
        )
    }
}

// ============================================================================
// SoundSettings
// ============================================================================

/// Sound preferences consulted when a tick produces a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Whether requests are produced at all
    pub enabled: bool,
    /// Volume carried by produced requests
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SoundSettings {
    /// Creates settings from a config.
    pub fn from_config(config: &TimerConfig) -> Self {
        Self {
            enabled: config.sound_enabled,
            volume: config.volume,
        }
    }

    /// Returns the volume to request with, or `None` when muted.
    pub fn request_volume(&self) -> Option<f32> {
        self.enabled.then_some(self.volume)
    }

    /// Sets the volume; touching the volume while muted turns sound back on.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.enabled = true;
    }

    /// Flips the enabled flag.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Read-only view of a countdown, used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Seconds left on the clock
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u32,
    /// Duration the countdown resets to
    #[serde(rename = "initialDurationSeconds")]
    pub initial_duration_seconds: u32,
    /// Current status
    pub status: TimerStatus,
}

impl TimerSnapshot {
    /// Formats the remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format_time(self.remaining_seconds)
    }

    /// Returns `remaining / initial`, or 0 when the initial duration is 0.
    pub fn progress(&self) -> f64 {
        if self.initial_duration_seconds == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.initial_duration_seconds)
    }

    /// Returns true while running in the last stretch of the countdown.
    pub fn is_urgent(&self) -> bool {
        self.status == TimerStatus::Running && self.remaining_seconds <= URGENT_THRESHOLD_SECONDS
    }
}

/// Formats a number of seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours.
pub fn format_time(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Returns the button label of a duration preset (`"30s"`, `"5m"`).
pub fn preset_label(seconds: u32) -> String {
    if seconds < 60 || seconds % 60 != 0 {
        format!("{}s", seconds)
    } else {
        format!("{}m", seconds / 60)
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of its accepted range.
    #[error("設定値が不正です: {0}")]
    Invalid(String),

    /// The configuration file could not be read.
    #[error("設定ファイルを読み込めません: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("設定ファイルの形式が不正です: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn default_duration_seconds() -> u32 {
    DEFAULT_DURATION_SECONDS
}

fn default_sound_enabled() -> bool {
    true
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_presets() -> Vec<u32> {
    DURATION_PRESETS.to_vec()
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

/// Configuration for the countdown timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Duration a new session starts with, in seconds
    #[serde(default = "default_duration_seconds")]
    pub default_duration_seconds: u32,
    /// Whether ticks and the alarm are played
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    /// Playback volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Duration presets, in seconds
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    /// Synthesis sample rate in Hz (8000-192000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_duration_seconds: DEFAULT_DURATION_SECONDS,
            sound_enabled: true,
            volume: DEFAULT_VOLUME,
            presets: default_presets(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl TimerConfig {
    /// Returns the configuration with the given default duration.
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.default_duration_seconds = seconds;
        self
    }

    /// Returns the configuration with the given volume.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Returns the configuration with sound switched on or off.
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(
                "音量は0.0-1.0の範囲で指定してください".to_string(),
            ));
        }
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::Invalid(
                "サンプルレートは8000-192000Hzの範囲で指定してください".to_string(),
            ));
        }
        if self.presets.is_empty() {
            return Err(ConfigError::Invalid(
                "プリセットを1つ以上指定してください".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default configuration file path
    /// (`<config_dir>/ticktock/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ticktock").join("config.json"))
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `path`, or from the default location.
    ///
    /// # Errors
    ///
    /// See [`TimerConfig::load_from`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerStatus Tests
    // ------------------------------------------------------------------------

    mod timer_status_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(TimerStatus::default(), TimerStatus::Idle);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerStatus::Idle.as_str(), "idle");
            assert_eq!(TimerStatus::Running.as_str(), "running");
            assert_eq!(TimerStatus::Paused.as_str(), "paused");
            assert_eq!(TimerStatus::Finished.as_str(), "finished");
        }

        #[test]
        fn test_label() {
            assert_eq!(TimerStatus::Running.label(), "CHALLENGE ACTIVE");
            assert_eq!(TimerStatus::Finished.label(), "FINISHED");
        }

        #[test]
        fn test_can_start() {
            assert!(TimerStatus::Idle.can_start());
            assert!(TimerStatus::Paused.can_start());
            assert!(!TimerStatus::Running.can_start());
            assert!(!TimerStatus::Finished.can_start());
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&TimerStatus::Paused).unwrap();
            assert_eq!(json, "\"paused\"");
        }
    }

    // ------------------------------------------------------------------------
    // SoundRequest Tests
    // ------------------------------------------------------------------------

    mod sound_request_tests {
        use super::*;

        #[test]
        fn test_accessors() {
            let tick = SoundRequest::Tick {
                volume: 0.25,
                emphasized: true,
            };
            assert_eq!(tick.volume(), 0.25);
            assert!(tick.is_emphasized());
            assert!(!tick.is_alarm());

            let alarm = SoundRequest::Alarm { volume: 0.75 };
            assert_eq!(alarm.volume(), 0.75);
            assert!(alarm.is_alarm());
            assert!(!alarm.is_emphasized());
        }

        #[test]
        fn test_serialize_tagged() {
            let json = serde_json::to_string(&SoundRequest::Alarm { volume: 0.5 }).unwrap();
            assert_eq!(json, r#"{"kind":"alarm","volume":0.5}"#);
        }
    }

    // ------------------------------------------------------------------------
    // SoundSettings Tests
    // ------------------------------------------------------------------------

    mod sound_settings_tests {
        use super::*;

        #[test]
        fn test_request_volume() {
            let settings = SoundSettings::default();
            assert_eq!(settings.request_volume(), Some(0.5));

            let muted = SoundSettings {
                enabled: false,
                volume: 0.5,
            };
            assert_eq!(muted.request_volume(), None);
        }

        #[test]
        fn test_set_volume_unmutes() {
            let mut settings = SoundSettings {
                enabled: false,
                volume: 0.5,
            };
            settings.set_volume(0.9);
            assert!(settings.enabled);
            assert_eq!(settings.volume, 0.9);
        }

        #[test]
        fn test_toggle() {
            let mut settings = SoundSettings::default();
            settings.toggle();
            assert!(!settings.enabled);
            settings.toggle();
            assert!(settings.enabled);
        }

        #[test]
        fn test_from_config() {
            let config = TimerConfig::default()
                .with_volume(0.3)
                .with_sound_enabled(false);
            let settings = SoundSettings::from_config(&config);
            assert_eq!(settings.volume, 0.3);
            assert!(!settings.enabled);
        }
    }

    // ------------------------------------------------------------------------
    // TimerSnapshot Tests
    // ------------------------------------------------------------------------

    mod snapshot_tests {
        use super::*;

        fn snapshot(remaining: u32, initial: u32, status: TimerStatus) -> TimerSnapshot {
            TimerSnapshot {
                remaining_seconds: remaining,
                initial_duration_seconds: initial,
                status,
            }
        }

        #[test]
        fn test_format_time() {
            assert_eq!(format_time(0), "00:00");
            assert_eq!(format_time(9), "00:09");
            assert_eq!(format_time(60), "01:00");
            assert_eq!(format_time(605), "10:05");
            assert_eq!(format_time(6000), "100:00");
        }

        #[test]
        fn test_progress() {
            assert_eq!(snapshot(30, 60, TimerStatus::Running).progress(), 0.5);
            assert_eq!(snapshot(60, 60, TimerStatus::Idle).progress(), 1.0);
        }

        #[test]
        fn test_progress_zero_duration() {
            assert_eq!(snapshot(0, 0, TimerStatus::Idle).progress(), 0.0);
        }

        #[test]
        fn test_is_urgent_only_while_running() {
            assert!(snapshot(10, 60, TimerStatus::Running).is_urgent());
            assert!(!snapshot(11, 60, TimerStatus::Running).is_urgent());
            assert!(!snapshot(5, 60, TimerStatus::Paused).is_urgent());
            assert!(!snapshot(0, 60, TimerStatus::Finished).is_urgent());
        }

        #[test]
        fn test_serialize_field_names() {
            let json = serde_json::to_string(&snapshot(5, 10, TimerStatus::Running)).unwrap();
            assert!(json.contains("\"remainingSeconds\":5"));
            assert!(json.contains("\"initialDurationSeconds\":10"));
            assert!(json.contains("\"status\":\"running\""));
        }
    }

    // ------------------------------------------------------------------------
    // Preset Tests
    // ------------------------------------------------------------------------

    mod preset_tests {
        use super::*;

        #[test]
        fn test_preset_labels() {
            let labels: Vec<String> = DURATION_PRESETS.iter().map(|s| preset_label(*s)).collect();
            assert_eq!(labels, vec!["10s", "30s", "1m", "3m", "5m", "10m"]);
        }

        #[test]
        fn test_preset_label_non_whole_minute() {
            assert_eq!(preset_label(90), "90s");
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfig Tests
    // ------------------------------------------------------------------------

    mod timer_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = TimerConfig::default();
            assert_eq!(config.default_duration_seconds, 60);
            assert!(config.sound_enabled);
            assert_eq!(config.volume, 0.5);
            assert_eq!(config.presets, vec![10, 30, 60, 180, 300, 600]);
            assert_eq!(config.sample_rate, 44_100);
        }

        #[test]
        fn test_builder_pattern() {
            let config = TimerConfig::default()
                .with_duration(30)
                .with_volume(0.8)
                .with_sound_enabled(false);

            assert_eq!(config.default_duration_seconds, 30);
            assert_eq!(config.volume, 0.8);
            assert!(!config.sound_enabled);
        }

        #[test]
        fn test_validate_success() {
            assert!(TimerConfig::default().validate().is_ok());
            assert!(TimerConfig::default().with_volume(0.0).validate().is_ok());
            assert!(TimerConfig::default().with_volume(1.0).validate().is_ok());
        }

        #[test]
        fn test_validate_volume_out_of_range() {
            assert!(TimerConfig::default().with_volume(1.5).validate().is_err());
            assert!(TimerConfig::default().with_volume(-0.1).validate().is_err());
        }

        #[test]
        fn test_validate_sample_rate() {
            let config = TimerConfig {
                sample_rate: 100,
                ..TimerConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_validate_empty_presets() {
            let config = TimerConfig {
                presets: Vec::new(),
                ..TimerConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_deserialize_partial_uses_defaults() {
            let config: TimerConfig = serde_json::from_str(r#"{"volume":0.2}"#).unwrap();
            assert_eq!(config.volume, 0.2);
            assert_eq!(config.default_duration_seconds, 60);
            assert!(config.sound_enabled);
        }

        #[test]
        fn test_load_missing_file_is_default() {
            let dir = tempfile::tempdir().unwrap();
            let config = TimerConfig::load_from(&dir.path().join("nope.json")).unwrap();
            assert_eq!(config, TimerConfig::default());
        }

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"default_duration_seconds":30,"sound_enabled":false}"#)
                .unwrap();

            let config = TimerConfig::load(Some(&path)).unwrap();
            assert_eq!(config.default_duration_seconds, 30);
            assert!(!config.sound_enabled);
        }

        #[test]
        fn test_load_invalid_json() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{not json").unwrap();

            let result = TimerConfig::load_from(&path);
            assert!(matches!(result, Err(ConfigError::Parse { .. })));
        }

        #[test]
        fn test_load_rejects_invalid_values() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"volume":3.0}"#).unwrap();

            let result = TimerConfig::load_from(&path);
            assert!(matches!(result, Err(ConfigError::Invalid(_))));
        }
    }
}
