//! Checkout route handlers.
//!
//! Checkout is a single form over the current cart. The backend computes
//! the authoritative totals when the order is placed; the summary shown
//! here is display math only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::marketplace::CheckoutRequest;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{CartView, OrderSummaryView};

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub billing_name: String,
    pub billing_email: String,
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
    pub summary: OrderSummaryView,
    pub billing_name: String,
    pub billing_email: String,
    pub error: Option<String>,
}

/// Treat whitespace-only form fields as absent.
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

/// Display the checkout page.
///
/// An empty cart has nothing to check out; redirect back to the cart page.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Response> {
    let cart = state.marketplace().cart(&auth.token).await?;
    if cart.items.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let summary = OrderSummaryView::from_subtotal(cart.subtotal);
    Ok(CheckoutTemplate {
        billing_name: auth.user.name.clone(),
        billing_email: auth.user.email.to_string(),
        current_user: Some(auth.user),
        cart: CartView::from(&cart),
        summary,
        error: None,
    }
    .into_response())
}

/// Place the order.
///
/// On success the backend empties the cart itself; we just follow the new
/// order to its confirmation page. On rejection the form re-renders with
/// the backend's message and a fresh cart snapshot.
#[instrument(skip(state, auth, form))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let request = CheckoutRequest {
        payment_method: none_if_blank(form.payment_method),
        billing_name: form.billing_name.trim().to_string(),
        billing_email: form.billing_email.trim().to_string(),
        billing_address: none_if_blank(form.billing_address),
        notes: none_if_blank(form.notes),
    };

    match state.marketplace().checkout(&auth.token, &request).await {
        Ok(order) => Ok(Redirect::to(&format!("/orders/{}", order.id)).into_response()),
        Err(e) => {
            tracing::warn!("checkout rejected: {e}");
            let cart = state.marketplace().cart(&auth.token).await?;
            if cart.items.is_empty() {
                return Ok(Redirect::to("/cart").into_response());
            }
            let summary = OrderSummaryView::from_subtotal(cart.subtotal);
            Ok(CheckoutTemplate {
                billing_name: request.billing_name,
                billing_email: request.billing_email,
                current_user: Some(auth.user),
                cart: CartView::from(&cart),
                summary,
                error: Some(e.message()),
            }
            .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_if_blank() {
        assert_eq!(none_if_blank(None), None);
        assert_eq!(none_if_blank(Some("  ".to_string())), None);
        assert_eq!(
            none_if_blank(Some(" card ".to_string())),
            Some("card".to_string())
        );
    }
}
