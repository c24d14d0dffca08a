//! Error taxonomy for the earnings pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to load credentials from {}: {reason}", path.display())]
    CredentialLoad { path: PathBuf, reason: String },

    #[error("Failed to load goals from {}: {reason}", path.display())]
    GoalLoad { path: PathBuf, reason: String },

    #[error("Invalid user ID or password")]
    InvalidCredentials,

    #[error("Invalid user ID: {0:?}")]
    InvalidUserId(String),

    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("Invalid earnings amount: {0:?}")]
    InvalidInput(String),

    /// The ledger exists but cannot be parsed. Appends are refused until the
    /// file is repaired so existing history is never overwritten.
    #[error("Ledger at {} is unreadable: {reason}", path.display())]
    LedgerLoad { path: PathBuf, reason: String },

    #[error("Failed to write ledger at {}: {reason}", path.display())]
    LedgerWrite { path: PathBuf, reason: String },

    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
