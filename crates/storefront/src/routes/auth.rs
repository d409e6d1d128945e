//! Authentication route handlers.
//!
//! The backend owns credentials; login exchanges them for a bearer token,
//! which is stored in the session together with a `CurrentUser` snapshot
//! from `GET /auth/me`. Logout flushes the whole session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use devshelf_core::{Email, UserRole};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_session_auth, set_session_auth};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    /// "on" when the seller checkbox is ticked.
    pub as_seller: Option<String>,
    pub company_name: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
}

/// Redirect back to a form page with a human-readable error message.
fn redirect_with_error(path: &str, message: &str) -> Response {
    let query = serde_urlencoded::to_string([("error", message)])
        .unwrap_or_else(|_| "error=failed".to_string());
    Redirect::to(&format!("{path}?{query}")).into_response()
}

/// Log the session in: store token and snapshot, tag Sentry.
async fn establish_session(session: &Session, token: &str, user: &CurrentUser) -> bool {
    if let Err(e) = set_session_auth(session, token, user).await {
        tracing::error!("failed to write session: {e}");
        return false;
    }
    set_sentry_user(&user.id, Some(&user.email.to_string()));
    true
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        current_user: None,
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let token = match state.marketplace().login(&form.email, &form.password).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("login failed: {e}");
            return redirect_with_error("/auth/login", &e.message());
        }
    };

    let user = match state.marketplace().me(&token.access_token).await {
        Ok(user) => CurrentUser::from(&user),
        Err(e) => {
            tracing::warn!("failed to fetch account after login: {e}");
            return redirect_with_error("/auth/login", "Could not load your account");
        }
    };

    if !establish_session(&session, &token.access_token, &user).await {
        return redirect_with_error("/auth/login", "Session error, please try again");
    }

    Redirect::to("/").into_response()
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        current_user: None,
        error: query.error,
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new account straight in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(e) = Email::parse(&form.email) {
        return redirect_with_error("/auth/register", &e.to_string());
    }
    if form.password != form.password_confirm {
        return redirect_with_error("/auth/register", "Passwords do not match");
    }
    if form.password.len() < 8 {
        return redirect_with_error("/auth/register", "Password must be at least 8 characters");
    }

    let as_seller = form.as_seller.is_some();
    let role = if as_seller {
        UserRole::Seller
    } else {
        UserRole::Buyer
    };
    let company_name = form
        .company_name
        .filter(|name| as_seller && !name.trim().is_empty());

    let token = match state
        .marketplace()
        .register(&form.email, &form.password, &form.name, role, company_name)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("registration failed: {e}");
            return redirect_with_error("/auth/register", &e.message());
        }
    };

    let user = match state.marketplace().me(&token.access_token).await {
        Ok(user) => CurrentUser::from(&user),
        Err(e) => {
            tracing::warn!("failed to fetch account after registration: {e}");
            return redirect_with_error(
                "/auth/login",
                "Account created, please log in",
            );
        }
    };

    if !establish_session(&session, &token.access_token, &user).await {
        return redirect_with_error("/auth/login", "Session error, please log in");
    }

    Redirect::to("/").into_response()
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_session_auth(&session).await {
        tracing::error!("failed to clear session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
