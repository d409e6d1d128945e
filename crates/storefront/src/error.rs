//! Application-level error type and Sentry user scope helpers.
//!
//! Route handlers return `Result<T, AppError>`; the `IntoResponse` impl
//! decides what the browser sees and reports server-side failures to
//! Sentry on the way out.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::marketplace::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    /// A backend call failed; carries the backend's detail message.
    #[error("Marketplace error: {0}")]
    Api(#[from] ApiError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // An expired or revoked token surfaces as a 401 from the next call;
        // send the user back to the login page instead of an error body.
        if let Self::Api(api) = &self
            && api.is_unauthorized()
        {
            return Redirect::to("/auth/login").into_response();
        }

        // Capture server-side failures to Sentry
        if matches!(self, Self::Api(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(api) => match api {
                ApiError::Api { status, .. } => {
                    // Pass client-caused statuses through; everything else
                    // from the backend is a gateway problem.
                    if status.is_client_error() {
                        *status
                    } else {
                        StatusCode::BAD_GATEWAY
                    }
                }
                ApiError::Http(_) | ApiError::Parse(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internals; the backend's detail message is already
        // written for end users.
        let message = match &self {
            Self::Api(api) => match api {
                ApiError::Api { .. } => api.message(),
                ApiError::Http(_) | ApiError::Parse(_) => "External service error".to_string(),
            },
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the logged-in user to the Sentry scope so captured errors carry
/// who hit them. Called after login/register.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Drop the user from the Sentry scope on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode as ReqStatus;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_client_error_passes_through() {
        let err = AppError::Api(ApiError::from_status_body(
            ReqStatus::NOT_FOUND,
            r#"{"detail":"Product not found"}"#,
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_unauthorized_redirects_to_login() {
        let err = AppError::Api(ApiError::from_status_body(
            ReqStatus::UNAUTHORIZED,
            r#"{"detail":"Could not validate credentials"}"#,
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/auth/login")
        );
    }
}
