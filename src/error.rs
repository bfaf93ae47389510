//! Error types shared across the crate.

use thiserror::Error;

/// Usage errors reported by the quiz scheduler.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no words found, add words first")]
    EmptyPool,
    #[error("no word is currently being asked")]
    NoActiveWord,
}

/// Errors emitted by the word, settings and lock stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("please enter at least one word")]
    EmptyList,
    #[error("locked: enter the teacher PIN to change the word list")]
    Locked,
}

/// Errors emitted by teacher lock operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LockError {
    #[error("already locked")]
    AlreadyLocked,
    #[error("already unlocked")]
    NotLocked,
    #[error("please use at least 4 digits")]
    InvalidPin,
    #[error("PINs do not match")]
    PinMismatch,
    #[error("incorrect PIN")]
    IncorrectPin,
    #[error(transparent)]
    Store(#[from] StoreError),
}
