//! # Error Types Module
//!
//! Typed errors for configuration loading, backend calls, channel membership
//! lookups and the registration flow itself.

use teloxide::dispatching::dialogue::InMemStorageError;
use thiserror::Error;

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("{0} must be set")]
    Missing(&'static str),
    /// An environment variable is set but cannot be parsed
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors returned by the REST backend client
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure, timeout or undecodable body
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The backend answered with a non-success status
    #[error("backend returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    /// An endpoint URL could not be built
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Why a channel membership lookup failed.
///
/// Every variant is treated as "not joined" by the subscription gate; the
/// classification only exists so logs say what actually went wrong.
#[derive(Debug, Clone, Error)]
pub enum MembershipError {
    /// Telegram could not be reached
    #[error("network error: {0}")]
    Network(String),
    /// The bot is not allowed to read the channel's member list
    #[error("permission error: {0}")]
    Permission(String),
    /// Telegram does not know the user
    #[error("unknown user: {0}")]
    UnknownUser(String),
    /// Anything else the API reported
    #[error("membership lookup failed: {0}")]
    Other(String),
}

/// Errors that abort the current registration or menu step
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The dialogue storage rejected a session read or write
    #[error("session storage error: {0}")]
    Session(#[from] InMemStorageError),
}
