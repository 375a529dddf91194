//! Sound system error types.
//!
//! Every error here is recoverable from the countdown's point of view: the
//! boundary layer logs them and keeps the timer going.

use thiserror::Error;

/// Errors that can occur while preparing or playing synthesized sounds.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("オーディオデバイスが利用できません: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create a playback stream on the opened device.
    #[error("オーディオストリームの作成に失敗しました: {0}")]
    StreamError(String),

    /// The suspended output could not be resumed.
    #[error("オーディオ出力を再開できませんでした: {0}")]
    ResumeFailed(String),

    /// Generic sound playback error.
    #[error("サウンド再生エラー: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error means there is no usable output device.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_))
    }

    /// Returns true if a later `resume` may fix this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StreamError(_) | Self::ResumeFailed(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "オーディオデバイスを接続してください",
            Self::StreamError(_) => "オーディオ設定を確認してください",
            Self::ResumeFailed(_) => "もう一度タイマーを開始してください",
            Self::PlaybackError(_) => "アプリケーションを再起動してください",
        }
    }
}
