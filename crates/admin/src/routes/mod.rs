//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Dashboard
//! GET  /login                          - Login page
//! POST /login                          - Login action (rate limited)
//! POST /logout                         - Logout action
//!
//! # Catalog (categories, items and coupons share this shape)
//! GET  /items                          - List (?q=, ?page=)
//! GET  /items/new                      - Create form
//! POST /items                          - Create
//! GET  /items/{id}                     - Edit form
//! POST /items/{id}                     - Update
//! POST /items/{id}/delete              - Delete
//!
//! # Orders
//! GET  /orders                         - List (?q=, ?page=, status flag filters)
//! POST /orders/bulk                    - Bulk action on selected orders
//! GET  /orders/{id}                    - Order detail
//! POST /orders/{id}/delivery           - Update delivery flags
//!
//! # Refunds
//! GET  /refunds                        - Refund requests, pending first
//! POST /refunds/{id}/accept            - Accept a refund request
//!
//! # Records (read-only)
//! GET  /addresses
//! GET  /payments
//! GET  /profiles
//! GET  /order-items
//! ```

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod records;
pub mod refunds;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::components::data_table::TableView;
use crate::filters;
use crate::middleware::{
    create_session_layer, login_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::page::PageContext;
use crate::state::AppState;

/// Search and page parameters shared by the list pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
}

/// Generic list page; every table renders through it.
#[derive(Template, WebTemplate)]
#[template(path = "list.html")]
pub struct ListTemplate {
    pub page: PageContext,
    pub table: TableView,
}

/// Create the session routes router.
///
/// Only the login submission is rate limited.
pub fn auth_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout));

    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route_layer(login_rate_limiter());

    pages.merge(submissions)
}

/// Create all page routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .merge(auth_routes())
        .route(
            "/categories",
            get(catalog::categories::index).post(catalog::categories::create),
        )
        .route("/categories/new", get(catalog::categories::new_form))
        .route(
            "/categories/{id}",
            get(catalog::categories::edit).post(catalog::categories::update),
        )
        .route("/categories/{id}/delete", post(catalog::categories::delete))
        .route("/items", get(catalog::items::index).post(catalog::items::create))
        .route("/items/new", get(catalog::items::new_form))
        .route(
            "/items/{id}",
            get(catalog::items::edit).post(catalog::items::update),
        )
        .route("/items/{id}/delete", post(catalog::items::delete))
        .route(
            "/coupons",
            get(catalog::coupons::index).post(catalog::coupons::create),
        )
        .route("/coupons/new", get(catalog::coupons::new_form))
        .route(
            "/coupons/{id}",
            get(catalog::coupons::edit).post(catalog::coupons::update),
        )
        .route("/coupons/{id}/delete", post(catalog::coupons::delete))
        .route("/orders", get(orders::index))
        .route("/orders/bulk", post(orders::bulk))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/delivery", post(orders::update_delivery))
        .route("/refunds", get(refunds::index))
        .route("/refunds/{id}/accept", post(refunds::accept))
        .route("/addresses", get(records::addresses))
        .route("/payments", get(records::payments))
        .route("/profiles", get(records::profiles))
        .route("/order-items", get(records::order_items))
}

/// Build the full admin application: pages, health checks, static files and
/// the middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// `"-"` for a missing value in a table cell.
pub(crate) fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}
