//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use wardrobe_core::models::Category;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::ItemView;

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub item: ItemView,
    pub category: Option<Category>,
    pub in_stock: bool,
}

/// Display a product by slug.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(slug): Path<String>,
) -> Result<ProductTemplate> {
    let catalog = CatalogRepository::new(state.pool());
    let item = catalog
        .item_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {slug}")))?;

    let category = catalog.category(item.category_id).await?;

    Ok(ProductTemplate {
        page,
        item: ItemView::new(&item, state.stripe().currency()),
        category,
        in_stock: item.quantity > 0,
    })
}
