//! Error types and handling for the chatcraps wagering engine.
//!
//! Rejections of player actions (wrong phase, duplicate bet, not enough
//! chips, ...) are ordinary values here: they carry the human-readable
//! reason the surface shows the player, and no session state mutates when
//! one is returned. Ledger failures are the only retryable category.

use thiserror::Error;

/// Result type alias for chatcraps operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bet: {0}")]
    InvalidBet(String),

    #[error("already have bet on {0}")]
    DuplicateBet(String),

    #[error("insufficient chips: need {required}, have {available} uncommitted")]
    InsufficientChips { required: u64, available: u64 },

    #[error("invalid wager: {0}")]
    InvalidWager(String),

    #[error("invalid dice roll: {0}")]
    InvalidRoll(String),

    #[error("no such pending decision: {0}")]
    NoPendingDecision(String),

    #[error("roll already in progress")]
    RollInProgress,

    #[error("game timed out; resume to continue")]
    SessionTimedOut,

    #[error("game is already active")]
    SessionActive,

    #[error("you already have an active craps game")]
    SessionExists,

    #[error("no active craps game")]
    SessionNotFound,

    #[error("game over")]
    SessionOver,

    #[error("session already settled")]
    AlreadySettled,

    #[error("ledger error: {0}")]
    Ledger(String),
}

impl Error {
    /// Create a ledger failure from any underlying error
    pub fn ledger(err: impl std::fmt::Display) -> Self {
        Error::Ledger(err.to_string())
    }

    /// Whether the caller should retry the same operation.
    ///
    /// Only external ledger failures are retryable; everything else is a
    /// rejection of the action itself and retrying verbatim cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Ledger(_))
    }

    /// Whether this is a local action rejection that left state untouched
    pub fn is_rejection(&self) -> bool {
        !self.is_retryable()
    }
}
