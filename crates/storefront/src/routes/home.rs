//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::{CategoryView, ProductCardView};

/// How many products each home page shelf shows.
const SHELF_SIZE: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub featured: Vec<ProductCardView>,
    pub new_arrivals: Vec<ProductCardView>,
    pub trending: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
///
/// A shelf that fails to load renders empty rather than failing the whole
/// page; the home page has no single source of truth to be strict about.
#[instrument(skip(state, auth))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let client = state.marketplace();

    let featured = client.featured_products(SHELF_SIZE).await.unwrap_or_else(|e| {
        tracing::warn!("failed to load featured shelf: {e}");
        Vec::new()
    });
    let new_arrivals = client.new_arrivals(SHELF_SIZE).await.unwrap_or_else(|e| {
        tracing::warn!("failed to load new arrivals shelf: {e}");
        Vec::new()
    });
    let trending = client.trending_products(SHELF_SIZE).await.unwrap_or_else(|e| {
        tracing::warn!("failed to load trending shelf: {e}");
        Vec::new()
    });
    let categories = client.categories().await?;

    Ok(HomeTemplate {
        current_user: auth.map(|a| a.user),
        featured: featured.iter().map(ProductCardView::from).collect(),
        new_arrivals: new_arrivals.iter().map(ProductCardView::from).collect(),
        trending: trending.iter().map(ProductCardView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}
