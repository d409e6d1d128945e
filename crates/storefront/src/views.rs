//! Shared display data for templates.
//!
//! Route handlers convert wire types into these pre-formatted view structs
//! so the display math (discount badges, tax line, pagination) lives in one
//! testable place instead of in templates.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use devshelf_core::{Price, ProductId};

use crate::marketplace::{Cart, CartItem, Category, Product, Review};

/// Display tax rate. Client-side presentation only; the backend computes the
/// authoritative tax at checkout.
const TAX_RATE_PERCENT: i64 = 10;

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_description: String,
    pub price: String,
    pub original_price: Option<String>,
    /// Rounded percentage for the discount badge, when the listing is marked
    /// down from `original_price`.
    pub discount_percent: Option<u32>,
    pub image_url: Option<String>,
    pub product_type: &'static str,
    pub rating: String,
    pub review_count: i64,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            short_description: product.short_description.clone().unwrap_or_default(),
            price: product.price.display(),
            original_price: product.original_price.map(|p| p.display()),
            discount_percent: discount_percent(product.price, product.original_price),
            image_url: product.image_url.clone(),
            product_type: product.product_type.label(),
            rating: format!("{:.1}", product.average_rating),
            review_count: product.review_count,
        }
    }
}

/// Rounded discount percentage, e.g. price 10.00 with original 20.00 → 50.
///
/// Returns `None` when there is no markdown to advertise.
#[must_use]
pub fn discount_percent(price: Price, original_price: Option<Price>) -> Option<u32> {
    let original = original_price?.amount();
    if original <= price.amount() || original.is_zero() {
        return None;
    }
    let ratio = (original - price.amount()) / original;
    (ratio * Decimal::new(100, 0)).round().to_u32()
}

/// Category link display data for navigation and filter controls.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub product_count: i64,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            product_count: category.product_count.unwrap_or_default(),
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image_url: Option<String>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let line_total = item.product.price * Decimal::from(item.quantity);
        Self {
            id: item.id.to_string(),
            product_id: item.product_id,
            slug: item.product.slug.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.product.price.display(),
            line_total: line_total.display(),
            image_url: item.product.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal.display(),
            item_count: cart.item_count,
        }
    }
}

/// Order totals for the checkout page.
///
/// Tax here is the fixed display multiplier; the server's checkout response
/// is authoritative for what the order actually costs.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl OrderSummaryView {
    /// Derive the display summary from a server-provided subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let tax = subtotal * Decimal::new(TAX_RATE_PERCENT, 2);
        let total = subtotal + tax;
        Self {
            subtotal: subtotal.display(),
            tax: tax.display(),
            total: total.display(),
        }
    }
}

/// Review display data.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub id: String,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    pub reviewer: String,
    pub helpful_count: i64,
    pub is_verified_purchase: bool,
    pub seller_response: Option<String>,
    pub created_at: String,
    /// Set when the viewing user wrote this review (enables edit/delete).
    pub is_own: bool,
}

impl ReviewView {
    /// Convert a wire review, marking ownership against the viewing user.
    #[must_use]
    pub fn from_review(review: &Review, viewer: Option<devshelf_core::UserId>) -> Self {
        Self {
            id: review.id.to_string(),
            rating: review.rating,
            title: review.title.clone().unwrap_or_default(),
            comment: review.comment.clone().unwrap_or_default(),
            reviewer: review
                .user
                .as_ref()
                .map_or_else(|| "Anonymous".to_string(), |u| u.name.clone()),
            helpful_count: review.helpful_count,
            is_verified_purchase: review.is_verified_purchase,
            seller_response: review.seller_response.clone(),
            created_at: format_date(review.created_at),
            is_own: viewer == Some(review.user_id),
        }
    }
}

/// Pagination display data.
#[derive(Debug, Clone)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl PaginationView {
    /// Build pagination state for a 1-indexed page.
    #[must_use]
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self {
            page,
            total_pages,
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
        }
    }
}

/// Format a backend timestamp for display, e.g. "Jan 15, 2026".
#[must_use]
pub fn format_date(value: chrono::NaiveDateTime) -> String {
    value.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Price {
        Price::from_cents(cents)
    }

    #[test]
    fn test_discount_badge_half_off() {
        // {price: 10.00, original_price: 20.00} displays a 50% badge
        assert_eq!(discount_percent(price(1000), Some(price(2000))), Some(50));
    }

    #[test]
    fn test_discount_badge_rounds() {
        // 29.99 -> 19.99 is a 33.34% markdown, badge shows 33
        assert_eq!(discount_percent(price(1999), Some(price(2999))), Some(33));
    }

    #[test]
    fn test_no_discount_without_markdown() {
        assert_eq!(discount_percent(price(1000), None), None);
        assert_eq!(discount_percent(price(1000), Some(price(1000))), None);
        assert_eq!(discount_percent(price(2000), Some(price(1000))), None);
    }

    #[test]
    fn test_order_summary_ten_percent_tax() {
        // Subtotal 100.00 displays tax 10.00 and total 110.00
        let summary = OrderSummaryView::from_subtotal(price(10000));
        assert_eq!(summary.subtotal, "$100.00");
        assert_eq!(summary.tax, "$10.00");
        assert_eq!(summary.total, "$110.00");
    }

    #[test]
    fn test_order_summary_rounds_to_cents() {
        let summary = OrderSummaryView::from_subtotal(price(1999));
        assert_eq!(summary.tax, "$2.00");
        assert_eq!(summary.total, "$21.99");
    }

    #[test]
    fn test_empty_cart_view() {
        let cart = CartView::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal, "$0.00");
        assert_eq!(cart.item_count, 0);
    }

    #[test]
    fn test_pagination_bounds() {
        let first = PaginationView::new(1, 3);
        assert_eq!(first.prev_page, None);
        assert_eq!(first.next_page, Some(2));

        let last = PaginationView::new(3, 3);
        assert_eq!(last.prev_page, Some(2));
        assert_eq!(last.next_page, None);

        let only = PaginationView::new(1, 1);
        assert_eq!(only.prev_page, None);
        assert_eq!(only.next_page, None);
    }
}
