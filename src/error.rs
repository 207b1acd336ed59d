//! Error types for the market digest tracker

use thiserror::Error;

/// Errors that can occur when fetching quotes from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),
}

/// Percent change could not be computed
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ChangeError {
    /// Baseline price is zero, or the result is not a finite number
    #[error("Cannot compute percent change from baseline {start} to {current}")]
    DivideByZero { start: f64, current: f64 },
}

/// Errors raised while building or refreshing a snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No quotes to build a baseline from
    #[error("Cannot create a snapshot from an empty quote set")]
    Empty,

    /// The same symbol appeared twice in the baseline quotes
    #[error("Duplicate symbol in baseline: {0}")]
    DuplicateSymbol(String),

    /// A quote names a symbol that has no baseline
    #[error("Quote for unknown symbol {0}: snapshot and provider disagree")]
    UnknownSymbol(String),

    /// A baselined symbol received no quote in this poll
    #[error("No quote received for tracked symbol {0}")]
    MissingQuote(String),
}

/// Errors reading or writing the persisted snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File could not be read or written
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not a valid snapshot
    #[error("Snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),

    /// File parsed but does not describe a usable snapshot
    #[error("Invalid snapshot file: {0}")]
    Invalid(#[from] SnapshotError),

    /// Temporary file could not be moved over the snapshot
    #[error("Failed to replace snapshot file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Errors delivering a digest
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Messaging API rejected the message
    #[error("Notification API error: {0}")]
    ApiError(String),
}

/// Errors loading the tracker configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is not set
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// Variable is set but cannot be parsed
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    /// Universe file could not be read
    #[error("Failed to read universe file: {0}")]
    Io(#[from] std::io::Error),

    /// Neither the universe file nor the tracked list names any symbol
    #[error("No symbols configured to track")]
    EmptyUniverse,
}

/// Errors that can end a tracking cycle
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Fetch(#[from] ProviderError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl ConfigError {
    /// Creates an Invalid error
    pub fn invalid(key: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
        }
    }
}
