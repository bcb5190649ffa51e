//! API error handling module
//!
//! Provides a unified error type for all API endpoints. Every variant renders
//! as `{"status": "error", "message": ..., "code": ...}`; redirect-format
//! requests that fail get the same JSON body.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tower_governor::GovernorError;
use wallpaper_core::{PositionError, StoreError};

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Not found - empty result or unknown route
    #[error("{0}")]
    NotFound(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Rate limit exceeded for the client address
    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The request did not complete within the configured limit
    #[error("Request did not complete within {}s", .0.as_secs())]
    RequestTimeout(Duration),

    /// Positional selection failed
    #[error(transparent)]
    Position(#[from] PositionError),

    /// The image store failed or timed out
    #[error("Image store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Map a rate limiter rejection.
    pub fn from_governor(err: GovernorError) -> Self {
        match err {
            GovernorError::TooManyRequests { wait_time, .. } => Self::RateLimited {
                retry_after_secs: wait_time,
            },
            GovernorError::UnableToExtractKey => {
                Self::Internal("Unable to determine client address".to_string())
            }
            GovernorError::Other { msg, .. } => {
                Self::Internal(msg.unwrap_or_else(|| "Rate limiter failure".to_string()))
            }
        }
    }

    /// Error for an empty image set.
    pub fn no_images() -> Self {
        Self::Position(PositionError::Empty)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Position(e) => match e {
                PositionError::Empty => StatusCode::NOT_FOUND,
                PositionError::Invalid(_) | PositionError::OutOfRange { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::RequestTimeout(_) => "REQUEST_TIMEOUT",
            Self::Position(e) => match e {
                PositionError::Invalid(_) => "INVALID_POSITION",
                PositionError::Empty => "NO_IMAGES",
                PositionError::OutOfRange { .. } => "POSITION_OUT_OF_RANGE",
            },
            Self::Store(e) => match e {
                StoreError::Timeout { .. } => "STORE_TIMEOUT",
                StoreError::Connection(_) => "STORE_UNAVAILABLE",
                StoreError::Config(_) | StoreError::Command(_) => "STORE_ERROR",
            },
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::RateLimited { .. } => "rate_limit",
            Self::RequestTimeout(_) => "timeout",
            Self::Position(_) => "position",
            Self::Store(_) => "store",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %message,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %message,
                "Client error"
            );
        }

        let mut body = json!({
            "status": "error",
            "message": message,
            "code": code,
        });
        if let Self::Position(PositionError::OutOfRange { total, .. }) = &self {
            body["available_positions"] = json!(total);
        }

        let mut response = (status, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        if let Self::RateLimited { retry_after_secs } = &self {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::no_images().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(PositionError::Invalid("abc".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Connection("refused".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::RequestTimeout(std::time::Duration::from_secs(30)).status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_governor_rejection_mapping() {
        let err = ApiError::from_governor(GovernorError::TooManyRequests {
            wait_time: 7,
            headers: None,
        });
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.error_code(), "RATE_LIMITED");

        let response = err.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let err = ApiError::from_governor(GovernorError::UnableToExtractKey);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_codes() {
        let timeout = ApiError::from(StoreError::Timeout {
            operation: "SMEMBERS",
            timeout: std::time::Duration::from_secs(5),
        });
        assert_eq!(timeout.error_code(), "STORE_TIMEOUT");
        assert_eq!(
            ApiError::from(PositionError::OutOfRange {
                requested: 5,
                total: 3
            })
            .error_code(),
            "POSITION_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_position_message_passes_through() {
        let err = ApiError::from(PositionError::OutOfRange {
            requested: 3,
            total: 3,
        });
        assert!(err.to_string().contains("0-2"));
        assert!(err.to_string().contains("-1 to -3"));
    }
}
