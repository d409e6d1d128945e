//! Typed HTTP client for the marketplace REST API.
//!
//! One method per backend endpoint, all returning `Result<_, ApiError>`.
//! There is no retry, timeout, or backoff; a failed call surfaces directly
//! to the initiating handler.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use devshelf_core::{CartItemId, ProductId, ProductStatus, ReviewId, UserRole};

use crate::config::MarketplaceApiConfig;

use super::ApiError;
use super::types::{
    Cart, CartItem, Category, CheckoutRequest, HelpfulCount, LoginRequest, Order,
    OrderListResponse, Product, ProductFilters, ProductInput, ProductListResponse, ProfileUpdate,
    RegisterRequest, Review, ReviewInput, SellerAnalytics, SellerOrder, Token, User,
    WishlistCheck, WishlistItem,
};

/// Client for the marketplace REST API.
///
/// Cheap to clone; all calls share one `reqwest::Client` connection pool.
#[derive(Clone)]
pub struct MarketplaceClient {
    inner: Arc<MarketplaceClientInner>,
}

struct MarketplaceClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl MarketplaceClient {
    /// Create a new marketplace API client.
    #[must_use]
    pub fn new(config: &MarketplaceApiConfig) -> Self {
        Self {
            inner: Arc::new(MarketplaceClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
            }),
        }
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and parse the JSON response.
    ///
    /// Reads the body as text first so non-success responses can be mined
    /// for the backend's `{"detail": ...}` message.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "marketplace API returned non-success status"
            );
            return Err(ApiError::from_status_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse marketplace API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and discard the response body (DELETE endpoints).
    async fn send_no_content(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status_body(status, &body));
        }

        Ok(())
    }

    fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        self.request(Method::GET, path, token)
    }

    fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> RequestBuilder {
        self.request(Method::POST, path, token).json(body)
    }

    fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> RequestBuilder {
        self.request(Method::PUT, path, token).json(body)
    }

    fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        self.request(Method::DELETE, path, token)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new account and receive a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    #[instrument(skip(self, password, company_name), fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
        company_name: Option<String>,
    ) -> Result<Token, ApiError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role,
            company_name,
        };
        self.send(self.post_json("/auth/register", None, &body))
            .await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.post_json("/auth/login", None, &body)).await
    }

    /// Fetch the authenticated account ("who am I").
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.send(self.get("/auth/me", Some(token))).await
    }

    /// Update profile fields on the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.send(self.put_json("/auth/me", Some(token), update))
            .await
    }

    /// Upgrade the authenticated buyer to a seller account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn become_seller(&self, token: &str, company_name: &str) -> Result<User, ApiError> {
        let builder = self
            .request(Method::POST, "/auth/become-seller", Some(token))
            .query(&[("company_name", company_name)]);
        self.send(builder).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send(self.get("/categories", None)).await
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn category_by_slug(&self, slug: &str) -> Result<Category, ApiError> {
        self.send(self.get(&format!("/categories/slug/{slug}"), None))
            .await
    }

    /// Search the product listing with filters, sort, and pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filters))]
    pub async fn products(
        &self,
        filters: &ProductFilters,
    ) -> Result<ProductListResponse, ApiError> {
        self.send(self.get("/products", None).query(filters)).await
    }

    /// Featured products shelf.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        self.send(
            self.get("/products/featured", None)
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// New arrivals shelf.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn new_arrivals(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        self.send(
            self.get("/products/new-arrivals", None)
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// Trending products shelf.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn trending_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        self.send(
            self.get("/products/trending", None)
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.send(self.get(&format!("/products/{id}"), None)).await
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ApiError> {
        self.send(self.get(&format!("/products/slug/{slug}"), None))
            .await
    }

    /// Create a product listing (seller only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token, input))]
    pub async fn create_product(
        &self,
        token: &str,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.send(self.post_json("/products", Some(token), input))
            .await
    }

    /// Update a product listing (seller only, own products).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.send(self.put_json(&format!("/products/{id}"), Some(token), input))
            .await
    }

    /// Delete a product listing (seller only, own products).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &str, id: ProductId) -> Result<(), ApiError> {
        self.send_no_content(self.delete(&format!("/products/{id}"), Some(token)))
            .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the whole cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &str) -> Result<Cart, ApiError> {
        self.send(self.get("/cart", Some(token))).await
    }

    /// Add a product to the cart.
    ///
    /// Callers are expected to refetch the cart afterwards; the returned
    /// item is the backend's acknowledgement, not the full cart state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id, quantity))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let body = serde_json::json!({ "product_id": product_id, "quantity": quantity });
        self.send(self.post_json("/cart/items", Some(token), &body))
            .await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(item_id = %item_id, quantity))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let body = serde_json::json!({ "quantity": quantity });
        self.send(self.put_json(&format!("/cart/items/{item_id}"), Some(token), &body))
            .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, token: &str, item_id: CartItemId) -> Result<(), ApiError> {
        self.send_no_content(self.delete(&format!("/cart/items/{item_id}"), Some(token)))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &str) -> Result<(), ApiError> {
        self.send_no_content(self.delete("/cart", Some(token))).await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// List the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &str) -> Result<Vec<WishlistItem>, ApiError> {
        self.send(self.get("/wishlist", Some(token))).await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        product_id: ProductId,
    ) -> Result<WishlistItem, ApiError> {
        let body = serde_json::json!({ "product_id": product_id });
        self.send(self.post_json("/wishlist", Some(token), &body))
            .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_no_content(self.delete(&format!("/wishlist/{product_id}"), Some(token)))
            .await
    }

    /// Whether a product is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn wishlist_contains(
        &self,
        token: &str,
        product_id: ProductId,
    ) -> Result<bool, ApiError> {
        let check: WishlistCheck = self
            .send(self.get(&format!("/wishlist/check/{product_id}"), Some(token)))
            .await?;
        Ok(check.in_wishlist)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Paginated order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<OrderListResponse, ApiError> {
        self.send(
            self.get("/orders", Some(token))
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, token: &str, id: devshelf_core::OrderId) -> Result<Order, ApiError> {
        self.send(self.get(&format!("/orders/{id}"), Some(token)))
            .await
    }

    /// Convert the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the request is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn checkout(
        &self,
        token: &str,
        request: &CheckoutRequest,
    ) -> Result<Order, ApiError> {
        self.send(self.post_json("/orders/checkout", Some(token), request))
            .await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Paginated reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_reviews(
        &self,
        product_id: ProductId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Review>, ApiError> {
        self.send(
            self.get(&format!("/reviews/product/{product_id}"), None)
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }

    /// Leave a review on a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected (e.g. duplicate review).
    #[instrument(skip(self, token, input), fields(product_id = %product_id))]
    pub async fn create_review(
        &self,
        token: &str,
        product_id: ProductId,
        input: &ReviewInput,
    ) -> Result<Review, ApiError> {
        self.send(self.post_json(&format!("/reviews/product/{product_id}"), Some(token), input))
            .await
    }

    /// Edit an existing review (owner only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token, input), fields(review_id = %review_id))]
    pub async fn update_review(
        &self,
        token: &str,
        review_id: ReviewId,
        input: &ReviewInput,
    ) -> Result<Review, ApiError> {
        self.send(self.put_json(&format!("/reviews/{review_id}"), Some(token), input))
            .await
    }

    /// Delete a review (owner only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(review_id = %review_id))]
    pub async fn delete_review(&self, token: &str, review_id: ReviewId) -> Result<(), ApiError> {
        self.send_no_content(self.delete(&format!("/reviews/{review_id}"), Some(token)))
            .await
    }

    /// Mark a review as helpful; returns the new count.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, token), fields(review_id = %review_id))]
    pub async fn mark_review_helpful(
        &self,
        token: &str,
        review_id: ReviewId,
    ) -> Result<i64, ApiError> {
        let body = serde_json::json!({});
        let count: HelpfulCount = self
            .send(self.post_json(&format!("/reviews/{review_id}/helpful"), Some(token), &body))
            .await?;
        Ok(count.helpful_count)
    }

    // =========================================================================
    // Seller
    // =========================================================================

    /// Aggregate analytics for the seller dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn seller_analytics(&self, token: &str) -> Result<SellerAnalytics, ApiError> {
        self.send(self.get("/seller/analytics", Some(token))).await
    }

    /// The seller's own products, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn seller_products(
        &self,
        token: &str,
        status: Option<ProductStatus>,
    ) -> Result<Vec<Product>, ApiError> {
        let mut builder = self.get("/seller/products", Some(token));
        if let Some(status) = status {
            builder = builder.query(&[("status_filter", status.as_str())]);
        }
        self.send(builder).await
    }

    /// Paginated sales from the seller side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn seller_orders(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<SellerOrder>, ApiError> {
        self.send(
            self.get("/seller/orders", Some(token))
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }

    /// Paginated reviews across the seller's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn seller_reviews(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Review>, ApiError> {
        self.send(
            self.get("/seller/reviews", Some(token))
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_join() {
        let client = MarketplaceClient::new(&MarketplaceApiConfig {
            api_url: "http://localhost:8000".to_string(),
        });
        let request = client
            .get("/products/slug/log-inspector", None)
            .build()
            .expect("request builds");
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/products/slug/log-inspector"
        );
    }

    #[test]
    fn test_bearer_header_attached_when_token_present() {
        let client = MarketplaceClient::new(&MarketplaceApiConfig {
            api_url: "http://localhost:8000".to_string(),
        });
        let request = client.get("/cart", Some("tok-123")).build().expect("builds");
        let auth = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .expect("auth header present");
        assert_eq!(auth.to_str().expect("ascii"), "Bearer tok-123");

        let request = client.get("/products", None).build().expect("builds");
        assert!(
            request
                .headers()
                .get(reqwest::header::AUTHORIZATION)
                .is_none()
        );
    }
}
