//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring marketplace authentication in route
//! handlers. Auth state is the session-stored bearer token plus the
//! `CurrentUser` snapshot; both are written together at login/register and
//! discarded together at logout.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// The authenticated state of one session: who, plus the token that proves it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Current-user snapshot from the last `GET /auth/me`.
    pub user: CurrentUser,
    /// Bearer token for the marketplace API.
    pub token: String,
}

/// Extractor that requires a logged-in user.
///
/// If the user is not logged in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(auth): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Extractor that requires a logged-in seller (or admin).
pub struct RequireSeller(pub AuthSession);

/// Error returned when authentication or role requirements are not met.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Logged in, but the role does not permit the route.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "Seller account required").into_response()
            }
        }
    }
}

async fn auth_from_parts(parts: &mut Parts) -> Option<AuthSession> {
    let session = parts.extensions.get::<Session>()?;

    let token: String = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()?;
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    Some(AuthSession { user, token })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        auth_from_parts(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireSeller
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = auth_from_parts(parts)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !auth.user.is_seller() {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(auth))
    }
}

/// Extractor that optionally gets the current auth state.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not
/// logged in. Every page template takes the `Option<CurrentUser>` from this
/// to render the header.
pub struct OptionalAuth(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(auth_from_parts(parts).await))
    }
}

/// Store the token and user snapshot in the session (login/register).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_auth(
    session: &Session,
    token: &str,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ACCESS_TOKEN, token).await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Discard all auth state (logout).
///
/// Flushes the whole session so cart badge state resets along with the user.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_session_auth(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
