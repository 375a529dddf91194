//! User input parsing for the interactive session and CLI flags.
//!
//! - Duration input coercion (anything unusable becomes 0)
//! - Preset labels (`30s`, `5m`)
//! - Session commands typed on stdin

/// Coerces free-form duration input to seconds.
///
/// Takes the leading integer of the trimmed input, like a lenient numeric
/// field: `"45"` → 45, `"12abc"` → 12. Non-numeric or negative input yields 0.
pub fn parse_duration_input(input: &str) -> u32 {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Parses a preset label such as `"30s"` or `"5m"` into seconds.
pub fn parse_preset_label(label: &str) -> Option<u32> {
    let label = label.trim();
    if let Some(minutes) = label.strip_suffix('m') {
        return minutes.parse::<u32>().ok()?.checked_mul(60);
    }
    if let Some(seconds) = label.strip_suffix('s') {
        return seconds.parse().ok();
    }
    None
}

/// Strict duration parser for command-line flags.
///
/// Accepts plain seconds or a preset label.
pub fn parse_duration_arg(s: &str) -> Result<u32, String> {
    if let Some(seconds) = parse_preset_label(s) {
        return Ok(seconds);
    }
    s.trim()
        .parse()
        .map_err(|_| format!("時間は秒数または 30s / 5m 形式で指定してください: {}", s))
}

/// Validates a volume flag.
pub fn parse_volume_arg(s: &str) -> Result<f32, String> {
    let volume: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("音量は数値で指定してください: {}", s))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err("音量は0.0-1.0の範囲で指定してください".to_string());
    }
    Ok(volume)
}

// ============================================================================
// SessionCommand
// ============================================================================

/// A command typed into the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Start when idle or paused, pause when running
    Toggle,
    /// Back to the full duration
    Reset,
    /// New duration in seconds
    SetDuration(u32),
    /// Flip sound on/off
    ToggleMute,
    /// New volume; also turns sound on
    SetVolume(f32),
    /// List presets
    Presets,
    /// Show help
    Help,
    /// Leave the session
    Quit,
    /// Not understood
    Unknown(String),
}

impl SessionCommand {
    /// Parses one input line.
    ///
    /// An empty line toggles, so pressing Enter works as start/pause.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("").to_ascii_lowercase();
        let rest = parts.next().unwrap_or("").trim();

        match head.as_str() {
            "" | "s" | "start" | "p" | "pause" => SessionCommand::Toggle,
            "r" | "reset" => SessionCommand::Reset,
            "d" | "duration" => SessionCommand::SetDuration(parse_duration_input(rest)),
            "m" | "mute" => SessionCommand::ToggleMute,
            "v" | "volume" => match parse_volume_arg(rest) {
                Ok(volume) => SessionCommand::SetVolume(volume),
                Err(_) => SessionCommand::Unknown(line.to_string()),
            },
            "l" | "presets" => SessionCommand::Presets,
            "h" | "help" | "?" => SessionCommand::Help,
            "q" | "quit" | "exit" => SessionCommand::Quit,
            digits if digits.bytes().all(|b| b.is_ascii_digit()) => {
                SessionCommand::SetDuration(parse_duration_input(digits))
            }
            other => match parse_preset_label(other) {
                Some(seconds) => SessionCommand::SetDuration(seconds),
                None => SessionCommand::Unknown(line.to_string()),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
