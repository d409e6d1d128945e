//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The backend owns the cart; every mutation is sent first and the whole
//! cart refetched afterwards, so the fragment rendered back always reflects
//! the server's state rather than an optimistic local copy.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::{CartItemId, ProductId};

use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::CartView;

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Fetch the cart for display, falling back to empty on failure.
async fn fetch_cart_view(state: &AppState, token: &str) -> CartView {
    match state.marketplace().cart(token).await {
        Ok(cart) => CartView::from(&cart),
        Err(e) => {
            tracing::warn!("failed to fetch cart: {e}");
            CartView::empty()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
///
/// Guests see an empty cart with a login prompt; the cart lives on the
/// backend and needs an account.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
    let (current_user, cart) = match auth {
        Some(auth) => {
            let cart = fetch_cart_view(&state, &auth.token).await;
            (Some(auth.user), cart)
        }
        None => (None, CartView::empty()),
    };

    CartShowTemplate { current_user, cart }
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so other cart elements
/// on the page refresh themselves.
#[instrument(skip(state, auth))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1).max(1);

    if let Err(e) = state
        .marketplace()
        .add_to_cart(&auth.token, form.product_id, quantity)
        .await
    {
        tracing::error!("failed to add item to cart: {e}");
        return Redirect::to("/cart").into_response();
    }

    let cart = fetch_cart_view(&state, &auth.token).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count,
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, auth))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    if let Err(e) = state
        .marketplace()
        .update_cart_item(&auth.token, form.item_id, form.quantity)
        .await
    {
        tracing::error!("failed to update cart item: {e}");
    }

    let cart = fetch_cart_view(&state, &auth.token).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, auth))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    if let Err(e) = state
        .marketplace()
        .remove_cart_item(&auth.token, form.item_id)
        .await
    {
        tracing::error!("failed to remove cart item: {e}");
    }

    let cart = fetch_cart_view(&state, &auth.token).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Empty the cart (HTMX).
#[instrument(skip(state, auth))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Response {
    if let Err(e) = state.marketplace().clear_cart(&auth.token).await {
        tracing::error!("failed to clear cart: {e}");
        let cart = fetch_cart_view(&state, &auth.token).await;
        return (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart },
        )
            .into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::empty(),
        },
    )
        .into_response()
}

/// Get the cart count badge (HTMX).
#[instrument(skip(state, auth))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
    let count = match auth {
        Some(auth) => fetch_cart_view(&state, &auth.token).await.item_count,
        None => 0,
    };

    CartCountTemplate { count }
}
