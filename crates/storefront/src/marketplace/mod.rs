//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - Plain JSON-over-HTTP via `reqwest` against the remote backend
//! - The backend is the source of truth - no local sync, no response cache
//! - Authenticated calls attach `Authorization: Bearer <token>`; the token
//!   lives in the caller's session, never in the client
//!
//! # Example
//!
//! ```rust,ignore
//! use devshelf_storefront::marketplace::MarketplaceClient;
//!
//! let client = MarketplaceClient::new(&config.marketplace);
//!
//! // Browse the catalog
//! let page = client.products(&ProductFilters::default()).await?;
//!
//! // Log in and read the cart
//! let token = client.login("buyer@devshelf.dev", "hunter2!").await?;
//! let cart = client.cart(&token.access_token).await?;
//! ```

mod client;
pub mod types;

pub use client::MarketplaceClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Fallback message when the backend returns no usable `detail` field.
pub const GENERIC_ERROR_DETAIL: &str = "An error occurred";

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network, DNS, connection).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing of a successful response failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the request with a non-success status.
    ///
    /// `detail` is the backend's error payload message, or
    /// [`GENERIC_ERROR_DETAIL`] when the body carries none.
    #[error("{detail}")]
    Api {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Human-readable message extracted from the `{"detail": ...}` body.
        detail: String,
    },
}

impl ApiError {
    /// Build an error from a non-success response body.
    ///
    /// The backend reports failures as `{"detail": "<message>"}`. Anything
    /// else (empty body, HTML error page, validation arrays) collapses to
    /// the generic fallback, matching what the UI can usefully display.
    #[must_use]
    pub fn from_status_body(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
            .unwrap_or_else(|| GENERIC_ERROR_DETAIL.to_string());
        Self::Api { status, detail }
    }

    /// Whether this error is an authentication failure (expired/missing token).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Api {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }

    /// The human-readable message to surface inline in a view.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_extracted_from_body() {
        let err =
            ApiError::from_status_body(StatusCode::BAD_REQUEST, r#"{"detail":"Cart is empty"}"#);
        assert_eq!(err.to_string(), "Cart is empty");
        assert!(matches!(
            err,
            ApiError::Api {
                status: StatusCode::BAD_REQUEST,
                ..
            }
        ));
    }

    #[test]
    fn test_detail_fallback_on_empty_body() {
        let err = ApiError::from_status_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), GENERIC_ERROR_DETAIL);
    }

    #[test]
    fn test_detail_fallback_on_non_string_detail() {
        // FastAPI validation errors carry a list under "detail"
        let err = ApiError::from_status_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","email"],"msg":"field required"}]}"#,
        );
        assert_eq!(err.to_string(), GENERIC_ERROR_DETAIL);
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::from_status_body(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Could not validate credentials"}"#,
        );
        assert!(err.is_unauthorized());

        let err = ApiError::from_status_body(StatusCode::NOT_FOUND, r#"{"detail":"missing"}"#);
        assert!(!err.is_unauthorized());
    }
}
