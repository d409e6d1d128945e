//! Review route handlers.
//!
//! Reviews are created and edited from the product detail page and bounce
//! back to it with an `error`/`success` query message. The helpful vote is
//! the one HTMX fragment here.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::{ProductId, ReviewId};

use crate::marketplace::ReviewInput;
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Create review form data; posted from the product page.
#[derive(Debug, Deserialize)]
pub struct CreateReviewForm {
    pub product_id: ProductId,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Edit review form data; carries the product slug to return to.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewForm {
    pub slug: String,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Delete review form data.
#[derive(Debug, Deserialize)]
pub struct DeleteReviewForm {
    pub slug: String,
}

/// Helpful vote count fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/helpful_count.html")]
pub struct HelpfulCountTemplate {
    pub count: i64,
}

fn review_input(rating: u8, title: Option<String>, comment: Option<String>) -> ReviewInput {
    ReviewInput {
        rating: rating.clamp(1, 5),
        title: title.filter(|t| !t.trim().is_empty()),
        comment: comment.filter(|c| !c.trim().is_empty()),
    }
}

fn back_to_product(slug: &str, message: &str) -> Response {
    Redirect::to(&format!("/products/{slug}?{message}")).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Leave a review on a product.
///
/// The backend enforces one review per buyer per product and verified
/// purchase marking; its rejection message is surfaced verbatim.
#[instrument(skip(state, auth, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(slug): Path<String>,
    Form(form): Form<CreateReviewForm>,
) -> Response {
    let input = review_input(form.rating, form.title, form.comment);

    match state
        .marketplace()
        .create_review(&auth.token, form.product_id, &input)
        .await
    {
        Ok(_) => back_to_product(&slug, "success=Review+posted"),
        Err(e) => {
            tracing::warn!("review rejected: {e}");
            let message = serde_urlencoded::to_string([("error", e.message())])
                .unwrap_or_else(|_| "error=Review+rejected".to_string());
            back_to_product(&slug, &message)
        }
    }
}

/// Edit an own review.
#[instrument(skip(state, auth, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<ReviewId>,
    Form(form): Form<UpdateReviewForm>,
) -> Response {
    let input = review_input(form.rating, form.title, form.comment);

    match state
        .marketplace()
        .update_review(&auth.token, id, &input)
        .await
    {
        Ok(_) => back_to_product(&form.slug, "success=Review+updated"),
        Err(e) => {
            tracing::warn!("review update rejected: {e}");
            let message = serde_urlencoded::to_string([("error", e.message())])
                .unwrap_or_else(|_| "error=Update+rejected".to_string());
            back_to_product(&form.slug, &message)
        }
    }
}

/// Delete an own review.
#[instrument(skip(state, auth, form))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<ReviewId>,
    Form(form): Form<DeleteReviewForm>,
) -> Response {
    match state.marketplace().delete_review(&auth.token, id).await {
        Ok(()) => back_to_product(&form.slug, "success=Review+deleted"),
        Err(e) => {
            tracing::warn!("review delete rejected: {e}");
            let message = serde_urlencoded::to_string([("error", e.message())])
                .unwrap_or_else(|_| "error=Delete+rejected".to_string());
            back_to_product(&form.slug, &message)
        }
    }
}

/// Mark a review as helpful (HTMX); returns the updated vote count.
#[instrument(skip(state, auth))]
pub async fn helpful(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<ReviewId>,
) -> Response {
    match state.marketplace().mark_review_helpful(&auth.token, id).await {
        Ok(count) => HelpfulCountTemplate { count }.into_response(),
        Err(e) => {
            // Leave the count untouched; a failed vote is not worth a page error.
            tracing::warn!("helpful vote rejected: {e}");
            axum::http::StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_input_normalizes() {
        let input = review_input(9, Some("  ".to_string()), Some("Solid tool".to_string()));
        assert_eq!(input.rating, 5);
        assert_eq!(input.title, None);
        assert_eq!(input.comment, Some("Solid tool".to_string()));

        let input = review_input(0, None, None);
        assert_eq!(input.rating, 1);
    }
}
