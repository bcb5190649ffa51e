//! Error types for the image set store.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the image set store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required connection parameters are missing or malformed
    #[error("Store configuration error: {0}")]
    Config(String),

    /// Could not open a connection (unreachable host, TLS or auth failure)
    #[error("Store connection error: {0}")]
    Connection(String),

    /// The operation did not finish within the configured timeout
    #[error("Store operation '{operation}' timed out after {}s", timeout.as_secs())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// A command was sent but the store rejected it
    #[error("Store command error: {0}")]
    Command(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
            Self::Connection(e.to_string())
        } else if e.is_timeout() {
            Self::Command(format!("timed out: {e}"))
        } else {
            Self::Command(e.to_string())
        }
    }
}
