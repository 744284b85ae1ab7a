//! Cart route handlers.
//!
//! Mutations are POSTs that flash the outcome and redirect back to the page
//! the customer clicked from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::cart::CartOutcome;
use wardrobe_core::models::Item;

use super::{CART_FALLBACK_PATH, redirect_back};
use crate::db::{CatalogRepository, OrderRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, RequireAuth};
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::SummaryView;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "order_summary.html")]
pub struct OrderSummaryTemplate {
    pub page: PageContext,
    pub summary: SummaryView,
}

async fn find_item(state: &AppState, slug: &str) -> Result<Item> {
    CatalogRepository::new(state.pool())
        .item_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {slug}")))
}

async fn finish(
    state: &AppState,
    flash: &Flash,
    headers: &HeaderMap,
    slug: &str,
    outcome: CartOutcome,
) -> Redirect {
    if outcome.changed() {
        add_breadcrumb("cart", outcome.message(), Some(&[("slug", slug)]));
    }
    flash.info(outcome.message()).await;
    redirect_back(headers, &state.config().base_url, CART_FALLBACK_PATH)
}

/// Add one unit of an item, creating the cart if needed.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let item = find_item(&state, &slug).await?;
    let outcome = OrderRepository::new(state.pool())
        .add_item(user.id, &item)
        .await?;
    Ok(finish(&state, &flash, &headers, &slug, outcome).await)
}

/// Remove an item's whole line.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let item = find_item(&state, &slug).await?;
    let outcome = OrderRepository::new(state.pool())
        .remove_item(user.id, &item)
        .await?;
    Ok(finish(&state, &flash, &headers, &slug, outcome).await)
}

/// Take one unit out; the line goes away when it reaches zero.
#[instrument(skip_all, fields(user_id = %user.id, slug = %slug))]
pub async fn remove_single_item_from_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let item = find_item(&state, &slug).await?;
    let outcome = OrderRepository::new(state.pool())
        .remove_single_item(user.id, &item)
        .await?;
    Ok(finish(&state, &flash, &headers, &slug, outcome).await)
}

/// Display the cart with its totals.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn order_summary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    let Some(cart) = orders.cart_for(user.id).await? else {
        flash.error(CartOutcome::NoActiveOrder.message()).await;
        return Ok(Redirect::to("/").into_response());
    };

    let summary = orders.summary(&cart).await?;

    Ok(OrderSummaryTemplate {
        page: PageContext::load(&state, &flash).await?,
        summary: SummaryView::new(&summary, state.stripe().currency()),
    }
    .into_response())
}
