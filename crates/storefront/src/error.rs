//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Fallible route handlers return
//! `Result<T, AppError>`; handlers that degrade gracefully instead (cart
//! fragments, the menu) log and render a fallback.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::platform::PlatformError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Platform backend call failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Not-found and bad-credential responses are expected traffic;
        // everything else goes to Sentry.
        let expected = matches!(
            self,
            Self::Platform(PlatformError::NotFound(_) | PlatformError::InvalidCredentials)
        );
        if !expected {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message) = match &self {
            Self::Platform(PlatformError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found"),
            Self::Platform(PlatformError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            Self::Platform(_) => (StatusCode::BAD_GATEWAY, "External service error"),
            Self::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a client ID.
///
/// Call this after the session identity is installed so errors are
/// associated with the client.
pub fn set_sentry_user(client_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(client_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the client.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Platform(PlatformError::NotFound(
                "client".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Platform(PlatformError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Platform(PlatformError::Api {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_backend_details_not_exposed() {
        let err = AppError::Platform(PlatformError::Api {
            status: 500,
            message: "stack trace with internals".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
