//! Display utilities for the ticktock CLI.
//!
//! This module provides formatted output for:
//! - The live countdown line
//! - State change messages
//! - Presets, sound settings and configuration
//! - Error messages

use std::io::{self, Write};
use std::path::Path;

use crate::types::{preset_label, SoundSettings, TimerConfig, TimerSnapshot, TimerStatus};

/// Width of the progress bar in characters.
const PROGRESS_WIDTH: usize = 20;

/// Returns the cursor to column 0 and clears the line.
const CLEAR_LINE: &str = "\r\x1b[2K";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Renders the countdown line, e.g. `[CHALLENGE ACTIVE] 00:42 ████░░ ♪50%`.
    ///
    /// The time is wrapped in `!` markers during the final seconds.
    pub fn render_status(snapshot: &TimerSnapshot, sound: &SoundSettings) -> String {
        let time = if snapshot.is_urgent() {
            format!("!{}!", snapshot.formatted_time())
        } else {
            format!(" {} ", snapshot.formatted_time())
        };
        format!(
            "[{}]{}{} {}",
            snapshot.status.label(),
            time,
            Self::progress_bar(snapshot.progress()),
            Self::sound_badge(sound)
        )
    }

    /// Renders a progress fraction as a fixed-width bar.
    pub fn progress_bar(progress: f64) -> String {
        let filled = (progress.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize;
        format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(PROGRESS_WIDTH - filled)
        )
    }

    /// Renders the sound setting as `♪50%` or `MUTE`.
    pub fn sound_badge(sound: &SoundSettings) -> String {
        if sound.enabled {
            format!("♪{:.0}%", sound.volume * 100.0)
        } else {
            "MUTE".to_string()
        }
    }

    /// Overwrites the current terminal line with the countdown status.
    pub fn show_status(snapshot: &TimerSnapshot, sound: &SoundSettings) {
        let mut stdout = io::stdout();
        let _ = write!(
            stdout,
            "{}{}",
            CLEAR_LINE,
            Self::render_status(snapshot, sound)
        );
        let _ = stdout.flush();
    }

    /// Shows the session banner and key help.
    pub fn show_welcome(snapshot: &TimerSnapshot) {
        println!("ticktock カウントダウンタイマー");
        println!("─────────────────────────────");
        println!("時間: {}", snapshot.formatted_time());
        Self::show_help();
    }

    /// Shows the session key help.
    pub fn show_help() {
        println!("{}操作:", CLEAR_LINE);
        println!("  Enter / s / p   開始・一時停止");
        println!("  r               リセット");
        println!("  d <秒>          時間を設定 (例: d 90)");
        println!("  90 / 30s / 5m   時間・プリセットを選択");
        println!("  l               プリセット一覧");
        println!("  m               サウンドのオン・オフ");
        println!("  v <0.0-1.0>     音量を設定");
        println!("  q               終了");
    }

    /// Shows a message for a status change.
    pub fn show_transition(snapshot: &TimerSnapshot) {
        let message = match snapshot.status {
            TimerStatus::Running => "> タイマーを開始しました",
            TimerStatus::Paused => "|| タイマーを一時停止しました",
            TimerStatus::Idle => "[] タイマーをリセットしました",
            TimerStatus::Finished => "* タイマーが終了しました",
        };
        println!("{}{}", CLEAR_LINE, message);
        println!("  残り時間: {}", snapshot.formatted_time());
    }

    /// Shows the duration confirmation.
    pub fn show_duration(seconds: u32) {
        println!(
            "{}* 時間を{}に設定しました",
            CLEAR_LINE,
            crate::types::format_time(seconds)
        );
    }

    /// Shows the end-of-countdown banner.
    pub fn show_finished() {
        println!("{}", CLEAR_LINE);
        println!("  ★ TIME'S UP! ★");
        println!("  r でリセット、d <秒> で新しい時間を設定");
    }

    /// Shows the duration presets.
    pub fn show_presets(presets: &[u32]) {
        println!("{}{}", CLEAR_LINE, Self::render_presets(presets));
    }

    /// Renders the presets as a single line of labels.
    pub fn render_presets(presets: &[u32]) -> String {
        let labels: Vec<String> = presets.iter().map(|s| preset_label(*s)).collect();
        format!("プリセット: {}", labels.join(" "))
    }

    /// Shows the sound setting after a change.
    pub fn show_sound(sound: &SoundSettings) {
        if sound.enabled {
            println!(
                "{}♪ サウンド: オン (音量 {:.0}%)",
                CLEAR_LINE,
                sound.volume * 100.0
            );
        } else {
            println!("{}♪ サウンド: オフ", CLEAR_LINE);
        }
    }

    /// Shows the effective configuration as JSON, with its source path.
    pub fn show_config(config: &TimerConfig, path: Option<&Path>) -> anyhow::Result<()> {
        match path {
            Some(path) if path.exists() => println!("設定ファイル: {}", path.display()),
            Some(path) => println!("設定ファイル: {} (未作成、既定値を使用)", path.display()),
            None => println!("設定ファイル: なし (既定値を使用)"),
        }
        println!("{}", serde_json::to_string_pretty(config)?);
        Ok(())
    }

    /// Shows a note about an unrecognized session command.
    pub fn show_unknown(input: &str) {
        println!("{}不明なコマンドです: {} (h でヘルプ)", CLEAR_LINE, input);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("{}エラー: {}", CLEAR_LINE, message);
    }
}

// ============================================================================
// Tests
// ============================================================================
