//! Countdown engine error types.

use thiserror::Error;

/// Errors returned by the countdown engine's command API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    /// `start` while already counting down.
    #[error("タイマーは既に実行中です")]
    AlreadyRunning,

    /// `start` after reaching zero; reset or set a new duration first.
    #[error("タイマーは終了しています。リセットしてください")]
    AlreadyFinished,

    /// `pause` while not counting down.
    #[error("タイマーは実行されていません")]
    NotRunning,

    /// Duration change requested while counting down.
    #[error("実行中は時間を変更できません")]
    ChangeWhileRunning,

    /// The engine task has exited.
    #[error("タイマーエンジンが停止しています")]
    EngineStopped,
}
