//! Order history route handlers.
//!
//! Orders are immutable once placed; these pages only read.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::OrderId;

use crate::error::Result;
use crate::filters;
use crate::marketplace::{Order, OrderItem};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{PaginationView, format_date};

/// Orders per history page.
const PAGE_SIZE: u32 = 10;

// =============================================================================
// View Types
// =============================================================================

/// One row of the order history table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: OrderId,
    pub order_number: String,
    pub status: &'static str,
    pub total: String,
    pub item_count: usize,
    pub placed_on: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status.label(),
            total: order.total.display(),
            item_count: order.items.len(),
            placed_on: format_date(order.created_at),
        }
    }
}

/// One purchased line on the order detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub slug: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub license_key: Option<String>,
    pub download_url: Option<String>,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item
                .product
                .as_ref()
                .map_or_else(|| format!("Product #{}", item.product_id), |p| p.name.clone()),
            slug: item.product.as_ref().map(|p| p.slug.clone()),
            quantity: item.quantity,
            price: item.price.display(),
            license_key: item.license_key.clone(),
            download_url: item.download_url.clone(),
        }
    }
}

/// Full order display data.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub order_number: String,
    pub status: &'static str,
    pub subtotal: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub billing_name: Option<String>,
    pub billing_email: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub placed_on: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            status: order.status.label(),
            subtotal: order.subtotal.display(),
            tax: order.tax.display(),
            discount: order.discount.display(),
            total: order.total.display(),
            payment_method: order.payment_method.clone(),
            payment_status: order.payment_status.clone(),
            billing_name: order.billing_name.clone(),
            billing_email: order.billing_email.clone(),
            billing_address: order.billing_address.clone(),
            notes: order.notes.clone(),
            placed_on: format_date(order.created_at),
            lines: order.items.iter().map(OrderLineView::from).collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub orders: Vec<OrderRowView>,
    pub pagination: PaginationView,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub order: OrderDetailView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order history.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let list = state
        .marketplace()
        .orders(&auth.token, page, PAGE_SIZE)
        .await?;

    let total_pages = total_pages(list.total, PAGE_SIZE);
    Ok(OrdersIndexTemplate {
        current_user: Some(auth.user),
        orders: list.orders.iter().map(OrderRowView::from).collect(),
        pagination: PaginationView::new(list.page, total_pages),
    })
}

/// Display a single order with its license keys and download links.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = state.marketplace().order(&auth.token, id).await?;

    Ok(OrderShowTemplate {
        current_user: Some(auth.user),
        order: OrderDetailView::from(&order),
    })
}

/// Page count for a history of `total` rows.
fn total_pages(total: i64, page_size: u32) -> u32 {
    let total = u32::try_from(total.max(0)).unwrap_or(u32::MAX);
    total.div_ceil(page_size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(-5, 10), 1);
    }
}
