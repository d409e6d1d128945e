//! Wire types for the marketplace REST API.
//!
//! These structs mirror the backend's JSON representation field for field.
//! The storefront never mutates them locally; each copy is a transient view
//! cache that lives until the next refetch.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use devshelf_core::{
    CartId, CartItemId, CategoryId, Email, LicenseType, OrderId, OrderItemId, OrderStatus, Price,
    ProductId, ProductStatus, ProductType, ReviewId, UserId, UserRole, WishlistItemId,
};

// =============================================================================
// Auth
// =============================================================================

/// Bearer token issued by login/register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// An authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request body (`PUT /auth/me`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category. Self-referential tree via `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub children: Option<Vec<Category>>,
    #[serde(default)]
    pub product_count: Option<i64>,
}

/// Seller summary embedded in a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerInfo {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A marketplace listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    pub product_type: ProductType,
    pub license_type: LicenseType,
    pub status: ProductStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    pub is_featured: bool,
    pub download_count: i64,
    pub view_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub seller: Option<SellerInfo>,
    #[serde(default)]
    pub category: Option<Category>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// One page of the product listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Sort keys accepted by `GET /products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
    Rating,
    Downloads,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filter set for `GET /products`, serialized straight into the query string.
///
/// Mirrors the listing page's URL parameters one to one so the browser URL
/// stays the single source of truth for filter state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<ProductSortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_only: Option<bool>,
}

/// Create/update payload for a seller's product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    pub product_type: ProductType,
    pub license_type: LicenseType,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

// =============================================================================
// Cart & Wishlist
// =============================================================================

/// A line in the cart, with the product embedded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: Product,
    pub created_at: NaiveDateTime,
}

/// The whole cart as the backend last reported it.
///
/// `subtotal` and `item_count` are server-computed; the storefront displays
/// them verbatim and never recomputes them locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub subtotal: Price,
    pub item_count: u32,
    pub created_at: NaiveDateTime,
}

/// A saved product on the wishlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: Product,
    pub created_at: NaiveDateTime,
}

/// Response of `GET /wishlist/check/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistCheck {
    pub in_wishlist: bool,
}

// =============================================================================
// Orders
// =============================================================================

/// One purchased line of an order, with price snapshotted at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub product: Option<Product>,
}

/// An order. Immutable after creation; the storefront only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal: Price,
    pub tax: Price,
    pub discount: Price,
    pub total: Price,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub payment_status: String,
    #[serde(default)]
    pub billing_name: Option<String>,
    #[serde(default)]
    pub billing_email: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One page of the order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Checkout request body (`POST /orders/checkout`).
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub billing_name: String,
    pub billing_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Reviews
// =============================================================================

/// Reviewer summary embedded in a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerInfo {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A product review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub helpful_count: i64,
    #[serde(default)]
    pub seller_response: Option<String>,
    pub is_verified_purchase: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub user: Option<ReviewerInfo>,
}

/// Create/update payload for a review. Rating is 1-5.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewInput {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Response of `POST /reviews/{id}/helpful`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpfulCount {
    pub helpful_count: i64,
}

// =============================================================================
// Seller
// =============================================================================

/// Aggregate numbers for the seller dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerAnalytics {
    pub total_products: i64,
    pub active_products: i64,
    pub total_orders: i64,
    pub total_revenue: Price,
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// A sale as seen from the seller side (one product per row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerOrder {
    pub id: OrderId,
    pub order_number: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: Price,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_product_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "seller_id": 2,
            "category_id": 3,
            "name": "Log Inspector",
            "slug": "log-inspector",
            "short_description": "Tail and search logs",
            "price": 10.0,
            "original_price": 20.0,
            "product_type": "tool",
            "license_type": "perpetual",
            "status": "active",
            "is_featured": true,
            "download_count": 120,
            "view_count": 890,
            "created_at": "2026-01-15T09:30:00",
            "updated_at": "2026-02-01T12:00:00",
            "average_rating": 4.5,
            "review_count": 12
        })
    }

    #[test]
    fn test_product_deserializes_backend_json() {
        let product: Product = serde_json::from_value(sample_product_json()).unwrap();
        assert_eq!(product.name, "Log Inspector");
        assert_eq!(product.product_type, devshelf_core::ProductType::Tool);
        assert_eq!(product.price.display(), "$10.00");
        assert_eq!(product.original_price.unwrap().display(), "$20.00");
        assert!(product.seller.is_none());
        assert!(product.description.is_none());
    }

    #[test]
    fn test_cart_deserializes_backend_json() {
        let json = serde_json::json!({
            "id": 9,
            "user_id": 2,
            "items": [{
                "id": 11,
                "product_id": 1,
                "quantity": 2,
                "product": sample_product_json(),
                "created_at": "2026-03-01T08:00:00"
            }],
            "subtotal": 20.0,
            "item_count": 2,
            "created_at": "2026-03-01T08:00:00"
        });
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.subtotal.display(), "$20.00");
    }

    #[test]
    fn test_order_deserializes_naive_timestamps() {
        let json = serde_json::json!({
            "id": 5,
            "buyer_id": 2,
            "order_number": "ORD-2026-0001",
            "status": "completed",
            "subtotal": 100.0,
            "tax": 10.0,
            "discount": 0.0,
            "total": 110.0,
            "payment_status": "paid",
            "items": [],
            "created_at": "2026-04-02T10:15:30",
            "updated_at": "2026-04-02T10:15:30"
        });
        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.status, devshelf_core::OrderStatus::Completed);
        assert_eq!(order.total.display(), "$110.00");
    }

    #[test]
    fn test_product_filters_skip_none_in_query() {
        let filters = ProductFilters {
            product_type: Some(devshelf_core::ProductType::Software),
            search: Some("editor".to_string()),
            ..Default::default()
        };
        let query = serde_urlencoded::to_string(&filters).unwrap();
        assert_eq!(query, "product_type=software&search=editor");
    }

    #[test]
    fn test_review_input_omits_empty_fields() {
        let input = ReviewInput {
            rating: 4,
            title: None,
            comment: Some("Solid".to_string()),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"rating": 4, "comment": "Solid"}));
    }
}
