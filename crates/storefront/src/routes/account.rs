//! Account settings route handlers.
//!
//! Profile edits go straight to the backend; the session's `CurrentUser`
//! snapshot is refreshed from the response so the header stays accurate.

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

use crate::error::Result;
use crate::filters;
use crate::marketplace::ProfileUpdate;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::routes::auth::MessageQuery;
use crate::state::AppState;

/// Settings form data.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub name: String,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub avatar_url: Option<String>,
}

/// Become-seller form data.
#[derive(Debug, Deserialize)]
pub struct BecomeSellerForm {
    pub company_name: String,
}

/// Profile fields shown on the settings page.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub is_seller: bool,
    pub company_name: String,
    pub company_description: String,
    pub avatar_url: String,
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/settings.html")]
pub struct SettingsTemplate {
    pub current_user: Option<CurrentUser>,
    pub profile: ProfileView,
    pub error: Option<String>,
    pub success: Option<String>,
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Overwrite the session's user snapshot after a profile change.
async fn refresh_snapshot(session: &Session, user: &CurrentUser) {
    if let Err(e) = session.insert(session_keys::CURRENT_USER, user).await {
        tracing::error!("failed to refresh session snapshot: {e}");
    }
}

/// Display the settings page.
///
/// Fetches the profile fresh; the session snapshot only carries enough for
/// the header.
#[instrument(skip(state, auth))]
pub async fn settings_page(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let user = state.marketplace().me(&auth.token).await?;

    Ok(SettingsTemplate {
        current_user: Some(auth.user),
        profile: ProfileView {
            email: user.email.to_string(),
            name: user.name.clone(),
            role: user.role.as_str(),
            is_seller: matches!(
                user.role,
                devshelf_core::UserRole::Seller | devshelf_core::UserRole::Admin
            ),
            company_name: user.company_name.unwrap_or_default(),
            company_description: user.company_description.unwrap_or_default(),
            avatar_url: user.avatar_url.unwrap_or_default(),
        },
        error: query.error,
        success: query.success,
    })
}

/// Handle the settings form submission.
#[instrument(skip(state, auth, session, form))]
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
    Form(form): Form<SettingsForm>,
) -> Response {
    let update = ProfileUpdate {
        name: Some(form.name.trim().to_string()).filter(|n| !n.is_empty()),
        company_name: none_if_blank(form.company_name),
        company_description: none_if_blank(form.company_description),
        avatar_url: none_if_blank(form.avatar_url),
    };

    match state.marketplace().update_profile(&auth.token, &update).await {
        Ok(user) => {
            refresh_snapshot(&session, &CurrentUser::from(&user)).await;
            Redirect::to("/account/settings?success=Profile+updated").into_response()
        }
        Err(e) => {
            tracing::warn!("profile update rejected: {e}");
            let query = serde_urlencoded::to_string([("error", e.message())])
                .unwrap_or_else(|_| "error=failed".to_string());
            Redirect::to(&format!("/account/settings?{query}")).into_response()
        }
    }
}

/// Upgrade the account to a seller.
///
/// On success the new role lands in the session immediately and the user
/// is taken to their new dashboard.
#[instrument(skip(state, auth, session, form))]
pub async fn become_seller(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
    Form(form): Form<BecomeSellerForm>,
) -> Response {
    let company_name = form.company_name.trim();
    if company_name.is_empty() {
        return Redirect::to("/account/settings?error=Company+name+is+required").into_response();
    }

    match state
        .marketplace()
        .become_seller(&auth.token, company_name)
        .await
    {
        Ok(user) => {
            refresh_snapshot(&session, &CurrentUser::from(&user)).await;
            Redirect::to("/seller").into_response()
        }
        Err(e) => {
            tracing::warn!("become-seller rejected: {e}");
            let query = serde_urlencoded::to_string([("error", e.message())])
                .unwrap_or_else(|_| "error=failed".to_string());
            Redirect::to(&format!("/account/settings?{query}")).into_response()
        }
    }
}
