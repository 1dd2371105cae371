//! Sync error types.

use thiserror::Error;

/// Errors that can occur while talking to the remote collection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Remote access was revoked; the subscription is not retried.
    #[error("Subscription cancelled: {0}")]
    SubscriptionCancelled(String),

    #[error("Remote collection not configured. Set database_url in config.")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Server returned status {0}")]
    StatusError(u16),

    #[error("Invalid payload: {0}")]
    PayloadError(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::HttpError(e.to_string())
    }
}
