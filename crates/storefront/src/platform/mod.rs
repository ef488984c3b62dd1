//! Platform REST backend client.
//!
//! The storefront owns no order or client data: everything lives behind the
//! platform's REST API. This module provides a typed client over that API
//! with an in-memory cache (moka, 5-minute TTL) for profile reads.
//!
//! # Endpoints consumed
//!
//! - `POST /login` - exchange credentials for the client identity
//! - `GET /client/{id}` / `PUT /client/{id}` - profile (includes stored cards)
//! - `POST /card` - store a new payment card
//! - `POST /order` / `GET /order/client/{id}` - order submission and history
//! - `GET /product` / `GET /product/{id}` - menu
//! - `GET /discount/{code}` - resolve a discount code
//! - `POST {upload_url}` - multipart profile image upload

mod client;
pub mod types;

pub use client::PlatformClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the platform backend.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed (connection, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected by the backend.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::NotFound("client 3".to_string());
        assert_eq!(err.to_string(), "Not found: client 3");

        let err = PlatformError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }
}
