//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (filters in query string)
//! GET  /products/{slug}        - Product detail with reviews
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout & Orders (requires auth)
//! GET  /checkout               - Checkout form (redirects to /cart when empty)
//! POST /checkout               - Place the order
//! GET  /orders                 - Order history
//! GET  /orders/{id}            - Order detail with license keys
//!
//! # Wishlist (requires auth)
//! GET  /wishlist               - Saved products
//! POST /wishlist/add           - Save a product
//! POST /wishlist/remove        - Remove a saved product
//!
//! # Reviews (requires auth)
//! POST /products/{slug}/reviews - Leave a review
//! POST /reviews/{id}           - Edit own review
//! POST /reviews/{id}/delete    - Delete own review
//! POST /reviews/{id}/helpful   - Helpful vote (returns count fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account/settings       - Profile settings
//! POST /account/settings       - Update profile
//! POST /account/become-seller  - Upgrade to a seller account
//!
//! # Seller dashboard (requires seller role)
//! GET  /seller                 - Analytics overview
//! GET  /seller/products        - Own listings (status filter in query)
//! GET  /seller/products/new    - New listing form
//! POST /seller/products        - Create listing
//! GET  /seller/products/{id}/edit - Edit listing form
//! POST /seller/products/{id}   - Update listing
//! POST /seller/products/{id}/delete - Delete listing
//! GET  /seller/orders          - Sales
//! GET  /seller/reviews         - Reviews across own listings
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod seller;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/reviews", post(reviews::create))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the review mutation routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", post(reviews::update))
        .route("/{id}/delete", post(reviews::delete))
        .route("/{id}/helpful", post(reviews::helpful))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(account::settings_page).post(account::update_settings),
        )
        .route("/become-seller", post(account::become_seller))
}

/// Create the seller dashboard router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(seller::dashboard))
        .route(
            "/products",
            get(seller::products).post(seller::create_product),
        )
        .route("/products/new", get(seller::new_product))
        .route("/products/{id}", post(seller::update_product))
        .route("/products/{id}/edit", get(seller::edit_product))
        .route("/products/{id}/delete", post(seller::delete_product))
        .route("/orders", get(seller::orders))
        .route("/reviews", get(seller::reviews))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::submit))
        // Orders
        .nest("/orders", order_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Review mutations
        .nest("/reviews", review_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Account
        .nest("/account", account_routes())
        // Seller dashboard
        .nest("/seller", seller_routes())
}
