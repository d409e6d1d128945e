//! Catalog route handlers: product listing and product detail.
//!
//! The listing page URL is the filter state. Query parameters deserialize
//! straight into [`ProductFilters`], pass through to the backend unchanged,
//! and pagination links re-serialize the same filters with a new page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::marketplace::{Product, ProductFilters};
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{CategoryView, PaginationView, ProductCardView, ReviewView, format_date};

/// Products per listing page.
const PAGE_SIZE: u32 = 12;

/// Reviews shown on the product detail page.
const REVIEWS_PAGE_SIZE: u32 = 10;

// =============================================================================
// View Types
// =============================================================================

/// Filter form state, echoed back into the listing page's controls.
#[derive(Debug, Clone)]
pub struct FilterStateView {
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub featured_only: bool,
    category_slug: Option<String>,
    product_type: Option<String>,
    license_type: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

impl FilterStateView {
    /// Whether the given category slug is the selected one.
    #[must_use]
    pub fn category_is(&self, slug: &str) -> bool {
        self.category_slug.as_deref() == Some(slug)
    }

    /// Whether the given product type wire value is the selected one.
    #[must_use]
    pub fn type_is(&self, value: &str) -> bool {
        self.product_type.as_deref() == Some(value)
    }

    /// Whether the given license type wire value is the selected one.
    #[must_use]
    pub fn license_is(&self, value: &str) -> bool {
        self.license_type.as_deref() == Some(value)
    }

    /// Whether the given sort key is the selected one.
    #[must_use]
    pub fn sort_is(&self, value: &str) -> bool {
        self.sort_by.as_deref() == Some(value)
    }

    /// Whether the given sort direction is the selected one.
    #[must_use]
    pub fn order_is(&self, value: &str) -> bool {
        self.sort_order.as_deref() == Some(value)
    }
}

impl From<&ProductFilters> for FilterStateView {
    fn from(f: &ProductFilters) -> Self {
        Self {
            search: f.search.clone().unwrap_or_default(),
            min_price: f.min_price.map(|p| p.to_string()).unwrap_or_default(),
            max_price: f.max_price.map(|p| p.to_string()).unwrap_or_default(),
            featured_only: f.featured_only.unwrap_or(false),
            category_slug: f.category_slug.clone(),
            product_type: f.product_type.map(|t| t.as_str().to_string()),
            license_type: f.license_type.map(|l| l.as_str().to_string()),
            sort_by: f
                .sort_by
                .and_then(|s| serde_json::to_value(s).ok())
                .and_then(|v| v.as_str().map(ToString::to_string)),
            sort_order: f
                .sort_order
                .and_then(|s| serde_json::to_value(s).ok())
                .and_then(|v| v.as_str().map(ToString::to_string)),
        }
    }
}

/// Product detail display data.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description_paragraphs: Vec<String>,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub image_url: Option<String>,
    pub product_type: &'static str,
    pub license_type: &'static str,
    pub version: Option<String>,
    pub demo_url: Option<String>,
    pub documentation_url: Option<String>,
    pub features: Vec<String>,
    pub requirements: Vec<String>,
    pub rating: String,
    pub review_count: i64,
    pub download_count: i64,
    pub seller_name: String,
    pub listed_on: String,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            description_paragraphs: split_lines(product.description.as_deref()),
            price: product.price.display(),
            original_price: product.original_price.map(|p| p.display()),
            discount_percent: crate::views::discount_percent(
                product.price,
                product.original_price,
            ),
            image_url: product.image_url.clone(),
            product_type: product.product_type.label(),
            license_type: product.license_type.label(),
            version: product.version.clone(),
            demo_url: product.demo_url.clone(),
            documentation_url: product.documentation_url.clone(),
            features: split_lines(product.features.as_deref()),
            requirements: split_lines(product.requirements.as_deref()),
            rating: format!("{:.1}", product.average_rating),
            review_count: product.review_count,
            download_count: product.download_count,
            seller_name: product.seller.as_ref().map_or_else(String::new, |s| {
                s.company_name.clone().unwrap_or_else(|| s.name.clone())
            }),
            listed_on: format_date(product.created_at),
        }
    }
}

/// Split a free-text field into non-empty display lines.
fn split_lines(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Pagination link preserving the current filters.
fn listing_url(filters: &ProductFilters, page: u32) -> String {
    let mut target = filters.clone();
    target.page = Some(page);
    serde_urlencoded::to_string(&target).map_or_else(
        |_| "/products".to_string(),
        |query| format!("/products?{query}"),
    )
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display after a redirect.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    /// The category being browsed, when the listing is filtered to one.
    pub heading_category: Option<CategoryView>,
    pub filters: FilterStateView,
    pub total: i64,
    pub pagination: PaginationView,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: ProductDetailView,
    pub reviews: Vec<ReviewView>,
    pub in_wishlist: bool,
    /// Set when the viewer already reviewed this product.
    pub has_own_review: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing page.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Query(mut filters): Query<ProductFilters>,
) -> Result<impl IntoResponse> {
    filters.page = Some(filters.page.unwrap_or(1).max(1));
    filters.page_size = Some(PAGE_SIZE);

    let list = state.marketplace().products(&filters).await?;
    let categories = state.marketplace().categories().await?;

    // An unknown slug still shows the (empty) listing, just without a
    // category heading.
    let mut heading_category = None;
    if let Some(slug) = filters.category_slug.as_deref() {
        match state.marketplace().category_by_slug(slug).await {
            Ok(category) => heading_category = Some(CategoryView::from(&category)),
            Err(e) => tracing::warn!("failed to load category {slug}: {e}"),
        }
    }

    let pagination = PaginationView::new(list.page, list.total_pages);
    let prev_url = pagination.prev_page.map(|p| listing_url(&filters, p));
    let next_url = pagination.next_page.map(|p| listing_url(&filters, p));

    Ok(ProductsIndexTemplate {
        current_user: auth.map(|a| a.user),
        products: list.products.iter().map(ProductCardView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
        heading_category,
        filters: FilterStateView::from(&filters),
        total: list.total,
        pagination,
        prev_url,
        next_url,
    })
}

/// Display the product detail page.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let product = state.marketplace().product_by_slug(&slug).await?;
    let reviews = state
        .marketplace()
        .product_reviews(product.id, 1, REVIEWS_PAGE_SIZE)
        .await?;

    let in_wishlist = match &auth {
        Some(auth) => state
            .marketplace()
            .wishlist_contains(&auth.token, product.id)
            .await
            .unwrap_or(false),
        None => false,
    };

    let viewer = auth.as_ref().map(|a| a.user.id);
    let reviews: Vec<ReviewView> = reviews
        .iter()
        .map(|r| ReviewView::from_review(r, viewer))
        .collect();
    let has_own_review = reviews.iter().any(|r| r.is_own);

    Ok(ProductShowTemplate {
        current_user: auth.map(|a| a.user),
        product: ProductDetailView::from(&product),
        reviews,
        in_wishlist,
        has_own_review,
        error: query.error,
        success: query.success,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_listing_url_preserves_filters() {
        let filters = ProductFilters {
            page: Some(1),
            page_size: Some(12),
            search: Some("editor".to_string()),
            min_price: Some(Decimal::new(500, 2)),
            ..ProductFilters::default()
        };
        let url = listing_url(&filters, 3);
        assert!(url.starts_with("/products?"));
        assert!(url.contains("page=3"));
        assert!(url.contains("search=editor"));
        assert!(url.contains("min_price=5.00"));
    }

    #[test]
    fn test_split_lines_drops_blanks() {
        let lines = split_lines(Some("Fast startup\n\n  Dark mode \n"));
        assert_eq!(lines, vec!["Fast startup", "Dark mode"]);
    }

    #[test]
    fn test_filter_state_selection_helpers() {
        let filters = ProductFilters {
            category_slug: Some("developer-tools".to_string()),
            product_type: Some(devshelf_core::ProductType::Tool),
            ..ProductFilters::default()
        };
        let view = FilterStateView::from(&filters);
        assert!(view.category_is("developer-tools"));
        assert!(!view.category_is("databases"));
        assert!(view.type_is("tool"));
        assert!(!view.license_is("free"));
    }
}
