//! Seller dashboard route handlers.
//!
//! Everything here requires the seller role (`RequireSeller`); the backend
//! additionally scopes every call to the authenticated seller's own data.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use devshelf_core::{
    CategoryId, LicenseType, ProductId, ProductStatus, ProductType,
};

use crate::error::Result;
use crate::filters;
use crate::marketplace::{Product, ProductInput, SellerAnalytics, SellerOrder};
use crate::middleware::RequireSeller;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{CategoryView, PaginationView, ReviewView, format_date};

/// Rows per page on the sales and reviews tabs.
const PAGE_SIZE: u32 = 20;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Product create/edit form data.
///
/// Price fields arrive as strings so that blank optional inputs can be
/// told apart from malformed ones.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub product_type: ProductType,
    pub license_type: LicenseType,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub version: Option<String>,
    pub demo_url: Option<String>,
    pub documentation_url: Option<String>,
    pub features: Option<String>,
    pub requirements: Option<String>,
}

impl ProductForm {
    /// Validate and convert into the wire payload.
    fn into_input(self) -> std::result::Result<ProductInput, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }

        let price: Decimal = self
            .price
            .trim()
            .parse()
            .map_err(|_| "Price must be a number".to_string())?;
        if price.is_sign_negative() {
            return Err("Price cannot be negative".to_string());
        }

        let original_price = match none_if_blank(self.original_price) {
            Some(raw) => Some(
                raw.parse::<Decimal>()
                    .map_err(|_| "Original price must be a number".to_string())?,
            ),
            None => None,
        };

        let category_id = match none_if_blank(self.category_id) {
            Some(raw) => Some(CategoryId::from(
                raw.parse::<i64>()
                    .map_err(|_| "Invalid category".to_string())?,
            )),
            None => None,
        };

        Ok(ProductInput {
            name,
            price,
            original_price,
            category_id,
            description: none_if_blank(self.description),
            short_description: none_if_blank(self.short_description),
            product_type: self.product_type,
            license_type: self.license_type,
            status: self.status,
            image_url: none_if_blank(self.image_url),
            version: none_if_blank(self.version),
            demo_url: none_if_blank(self.demo_url),
            documentation_url: none_if_blank(self.documentation_url),
            features: none_if_blank(self.features),
            requirements: none_if_blank(self.requirements),
        })
    }
}

/// Status filter for the listings tab.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<ProductStatus>,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Query parameters for error display after a redirect.
#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

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

// =============================================================================
// View Types
// =============================================================================

/// Dashboard analytics display data.
#[derive(Debug, Clone)]
pub struct AnalyticsView {
    pub total_products: i64,
    pub active_products: i64,
    pub total_orders: i64,
    pub total_revenue: String,
    pub average_rating: String,
    pub total_reviews: i64,
}

impl From<&SellerAnalytics> for AnalyticsView {
    fn from(a: &SellerAnalytics) -> Self {
        Self {
            total_products: a.total_products,
            active_products: a.active_products,
            total_orders: a.total_orders,
            total_revenue: a.total_revenue.display(),
            average_rating: format!("{:.1}", a.average_rating),
            total_reviews: a.total_reviews,
        }
    }
}

/// One row of the seller's listings table.
#[derive(Debug, Clone)]
pub struct ListingRowView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub status: &'static str,
    pub status_value: &'static str,
    pub price: String,
    pub download_count: i64,
    pub rating: String,
    pub updated_on: String,
}

impl From<&Product> for ListingRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            status: match product.status {
                ProductStatus::Active => "Active",
                ProductStatus::Inactive => "Inactive",
                ProductStatus::Draft => "Draft",
            },
            status_value: product.status.as_str(),
            price: product.price.display(),
            download_count: product.download_count,
            rating: format!("{:.1}", product.average_rating),
            updated_on: format_date(product.updated_at),
        }
    }
}

/// One sale row.
#[derive(Debug, Clone)]
pub struct SaleRowView {
    pub order_number: String,
    pub buyer: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: String,
    pub status: &'static str,
    pub placed_on: String,
}

impl From<&SellerOrder> for SaleRowView {
    fn from(order: &SellerOrder) -> Self {
        Self {
            order_number: order.order_number.clone(),
            buyer: order.buyer_name.clone(),
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            price: order.price.display(),
            status: order.status.label(),
            placed_on: format_date(order.created_at),
        }
    }
}

/// Echo of the product form's current values, shared by new and edit.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub price: String,
    pub original_price: String,
    pub description: String,
    pub short_description: String,
    pub image_url: String,
    pub version: String,
    pub demo_url: String,
    pub documentation_url: String,
    pub features: String,
    pub requirements: String,
    category_id: Option<String>,
    product_type: Option<String>,
    license_type: Option<String>,
    status: Option<String>,
}

impl ProductFormView {
    #[must_use]
    pub fn category_is(&self, id: &str) -> bool {
        self.category_id.as_deref() == Some(id)
    }

    #[must_use]
    pub fn type_is(&self, value: &str) -> bool {
        self.product_type.as_deref() == Some(value)
    }

    #[must_use]
    pub fn license_is(&self, value: &str) -> bool {
        self.license_type.as_deref() == Some(value)
    }

    #[must_use]
    pub fn status_is(&self, value: &str) -> bool {
        self.status.as_deref() == Some(value)
    }
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount().to_string(),
            original_price: product
                .original_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            short_description: product.short_description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
            version: product.version.clone().unwrap_or_default(),
            demo_url: product.demo_url.clone().unwrap_or_default(),
            documentation_url: product.documentation_url.clone().unwrap_or_default(),
            features: product.features.clone().unwrap_or_default(),
            requirements: product.requirements.clone().unwrap_or_default(),
            category_id: product.category_id.map(|id| id.to_string()),
            product_type: Some(product.product_type.as_str().to_string()),
            license_type: Some(product.license_type.as_str().to_string()),
            status: Some(product.status.as_str().to_string()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Dashboard overview template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub analytics: AnalyticsView,
}

/// Listings tab template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/products.html")]
pub struct SellerProductsTemplate {
    pub current_user: Option<CurrentUser>,
    pub listings: Vec<ListingRowView>,
    pub status_filter: Option<&'static str>,
    pub error: Option<String>,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/product_form.html")]
pub struct ProductFormTemplate {
    pub current_user: Option<CurrentUser>,
    /// Form post target; differs between create and edit.
    pub action: String,
    pub heading: &'static str,
    pub form: ProductFormView,
    pub categories: Vec<CategoryView>,
    pub error: Option<String>,
}

/// Sales tab template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/orders.html")]
pub struct SellerOrdersTemplate {
    pub current_user: Option<CurrentUser>,
    pub sales: Vec<SaleRowView>,
    pub pagination: PaginationView,
}

/// Reviews tab template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/reviews.html")]
pub struct SellerReviewsTemplate {
    pub current_user: Option<CurrentUser>,
    pub reviews: Vec<ReviewView>,
    pub pagination: PaginationView,
}

async fn form_categories(state: &AppState) -> Vec<CategoryView> {
    match state.marketplace().categories().await {
        Ok(categories) => categories.iter().map(CategoryView::from).collect(),
        Err(e) => {
            tracing::warn!("failed to load categories for form: {e}");
            Vec::new()
        }
    }
}

fn redirect_with_error(path: &str, message: &str) -> Response {
    let query = serde_urlencoded::to_string([("error", message)])
        .unwrap_or_else(|_| "error=failed".to_string());
    Redirect::to(&format!("{path}?{query}")).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the analytics overview.
#[instrument(skip(state, auth))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
) -> Result<impl IntoResponse> {
    let analytics = state.marketplace().seller_analytics(&auth.token).await?;

    Ok(DashboardTemplate {
        current_user: Some(auth.user),
        analytics: AnalyticsView::from(&analytics),
    })
}

/// Display the seller's own listings.
#[instrument(skip(state, auth))]
pub async fn products(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Query(status): Query<StatusQuery>,
    Query(message): Query<ErrorQuery>,
) -> Result<impl IntoResponse> {
    let listings = state
        .marketplace()
        .seller_products(&auth.token, status.status)
        .await?;

    Ok(SellerProductsTemplate {
        current_user: Some(auth.user),
        listings: listings.iter().map(ListingRowView::from).collect(),
        status_filter: status.status.map(ProductStatus::as_str),
        error: message.error,
    })
}

/// Display the new listing form.
#[instrument(skip(state, auth))]
pub async fn new_product(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Query(message): Query<ErrorQuery>,
) -> impl IntoResponse {
    let categories = form_categories(&state).await;

    ProductFormTemplate {
        current_user: Some(auth.user),
        action: "/seller/products".to_string(),
        heading: "New listing",
        form: ProductFormView::default(),
        categories,
        error: message.error,
    }
}

/// Create a listing.
#[instrument(skip(state, auth, form))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with_error("/seller/products/new", &message),
    };

    match state.marketplace().create_product(&auth.token, &input).await {
        Ok(_) => Redirect::to("/seller/products").into_response(),
        Err(e) => {
            tracing::warn!("listing creation rejected: {e}");
            redirect_with_error("/seller/products/new", &e.message())
        }
    }
}

/// Display the edit form for an own listing.
#[instrument(skip(state, auth))]
pub async fn edit_product(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Path(id): Path<ProductId>,
    Query(message): Query<ErrorQuery>,
) -> Result<impl IntoResponse> {
    let product = state.marketplace().product(id).await?;
    let categories = form_categories(&state).await;

    Ok(ProductFormTemplate {
        current_user: Some(auth.user),
        action: format!("/seller/products/{id}"),
        heading: "Edit listing",
        form: ProductFormView::from(&product),
        categories,
        error: message.error,
    })
}

/// Update a listing.
#[instrument(skip(state, auth, form))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let edit_path = format!("/seller/products/{id}/edit");
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return redirect_with_error(&edit_path, &message),
    };

    match state
        .marketplace()
        .update_product(&auth.token, id, &input)
        .await
    {
        Ok(_) => Redirect::to("/seller/products").into_response(),
        Err(e) => {
            tracing::warn!("listing update rejected: {e}");
            redirect_with_error(&edit_path, &e.message())
        }
    }
}

/// Delete a listing.
#[instrument(skip(state, auth))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Path(id): Path<ProductId>,
) -> Response {
    match state.marketplace().delete_product(&auth.token, id).await {
        Ok(()) => Redirect::to("/seller/products").into_response(),
        Err(e) => {
            tracing::warn!("listing delete rejected: {e}");
            redirect_with_error("/seller/products", &e.message())
        }
    }
}

/// Display the sales tab.
#[instrument(skip(state, auth))]
pub async fn orders(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let sales = state
        .marketplace()
        .seller_orders(&auth.token, page, PAGE_SIZE)
        .await?;

    // The backend does not report a total; a full page implies a next one.
    let total_pages = if sales.len() as u32 >= PAGE_SIZE {
        page + 1
    } else {
        page
    };

    Ok(SellerOrdersTemplate {
        current_user: Some(auth.user),
        sales: sales.iter().map(SaleRowView::from).collect(),
        pagination: PaginationView::new(page, total_pages),
    })
}

/// Display the reviews tab.
#[instrument(skip(state, auth))]
pub async fn reviews(
    State(state): State<AppState>,
    RequireSeller(auth): RequireSeller,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let reviews = state
        .marketplace()
        .seller_reviews(&auth.token, page, PAGE_SIZE)
        .await?;

    let total_pages = if reviews.len() as u32 >= PAGE_SIZE {
        page + 1
    } else {
        page
    };

    Ok(SellerReviewsTemplate {
        current_user: Some(auth.user),
        reviews: reviews
            .iter()
            .map(|r| ReviewView::from_review(r, None))
            .collect(),
        pagination: PaginationView::new(page, total_pages),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_form() -> ProductForm {
        ProductForm {
            name: "Log Inspector".to_string(),
            price: "19.99".to_string(),
            original_price: None,
            category_id: None,
            description: None,
            short_description: None,
            product_type: ProductType::Tool,
            license_type: LicenseType::Perpetual,
            status: ProductStatus::Active,
            image_url: None,
            version: None,
            demo_url: None,
            documentation_url: None,
            features: None,
            requirements: None,
        }
    }

    #[test]
    fn test_product_form_parses_prices() {
        let mut form = base_form();
        form.original_price = Some("29.99".to_string());
        let input = form.into_input().unwrap();
        assert_eq!(input.price, Decimal::new(1999, 2));
        assert_eq!(input.original_price, Some(Decimal::new(2999, 2)));
    }

    #[test]
    fn test_product_form_blank_optionals() {
        let mut form = base_form();
        form.original_price = Some(String::new());
        form.category_id = Some("  ".to_string());
        let input = form.into_input().unwrap();
        assert_eq!(input.original_price, None);
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_product_form_rejects_bad_price() {
        let mut form = base_form();
        form.price = "free".to_string();
        assert!(form.into_input().is_err());

        let mut form = base_form();
        form.price = "-1".to_string();
        assert!(form.into_input().is_err());
    }

    #[test]
    fn test_product_form_requires_name() {
        let mut form = base_form();
        form.name = "   ".to_string();
        assert!(form.into_input().is_err());
    }
}
