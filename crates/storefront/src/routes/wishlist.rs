//! Wishlist route handlers.
//!
//! Add/remove are plain form posts that bounce back to where they came
//! from via a `next` field, so the same form works on product pages and
//! the wishlist page itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{ProductCardView, format_date};

/// Wishlist mutation form data.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: ProductId,
    /// Path to return to after the mutation.
    pub next: Option<String>,
}

/// One saved product row.
#[derive(Debug, Clone)]
pub struct WishlistRowView {
    pub product: ProductCardView,
    pub saved_on: String,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/index.html")]
pub struct WishlistTemplate {
    pub current_user: Option<CurrentUser>,
    pub items: Vec<WishlistRowView>,
}

/// Only same-site paths are allowed as redirect targets.
fn redirect_target(next: Option<String>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/wishlist".to_string(),
    }
}

/// Display the wishlist.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<impl IntoResponse> {
    let items = state.marketplace().wishlist(&auth.token).await?;

    Ok(WishlistTemplate {
        current_user: Some(auth.user),
        items: items
            .iter()
            .map(|item| WishlistRowView {
                product: ProductCardView::from(&item.product),
                saved_on: format_date(item.created_at),
            })
            .collect(),
    })
}

/// Save a product to the wishlist.
#[instrument(skip(state, auth))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<WishlistForm>,
) -> Response {
    if let Err(e) = state
        .marketplace()
        .add_to_wishlist(&auth.token, form.product_id)
        .await
    {
        // Duplicate saves are a no-op from the user's point of view.
        tracing::warn!("failed to add to wishlist: {e}");
    }

    Redirect::to(&redirect_target(form.next)).into_response()
}

/// Remove a product from the wishlist.
#[instrument(skip(state, auth))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<WishlistForm>,
) -> Response {
    if let Err(e) = state
        .marketplace()
        .remove_from_wishlist(&auth.token, form.product_id)
        .await
    {
        tracing::warn!("failed to remove from wishlist: {e}");
    }

    Redirect::to(&redirect_target(form.next)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_target_rejects_offsite() {
        assert_eq!(redirect_target(None), "/wishlist");
        assert_eq!(
            redirect_target(Some("/products/vim-pro".to_string())),
            "/products/vim-pro"
        );
        assert_eq!(
            redirect_target(Some("https://evil.example".to_string())),
            "/wishlist"
        );
        assert_eq!(redirect_target(Some("//evil.example".to_string())), "/wishlist");
    }
}
