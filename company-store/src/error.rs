//! Error types for the selection ports and configuration.
//!
//! None of these reach the store's callers: the store logs them and degrades
//! to "no selection". They are typed so port implementations and tests can
//! tell the failure classes apart.

use thiserror::Error;

/// Failure reading or writing the persisted selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is disabled or not reachable (private mode, quota, no window).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The stored value exists but is not a valid `CompanySummary`.
    #[error("malformed stored selection: {0}")]
    Malformed(String),
}

/// Failure reading or rewriting the page URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("could not parse location: {0}")]
    Parse(String),

    #[error("history replace failed: {0}")]
    History(String),
}

/// Failure resolving a company id to a `CompanySummary`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("company '{0}' not found")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode company record: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
