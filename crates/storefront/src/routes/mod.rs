//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Catalog (?page=, ?category=)
//! GET  /product/{slug}                 - Product detail
//!
//! # Cart (login required, POST + redirect back)
//! POST /add-to-cart/{slug}             - Add one unit
//! POST /remove-from-cart/{slug}        - Remove the whole line
//! POST /remove-item-from-cart/{slug}   - Remove one unit
//! GET  /order-summary                  - Cart page
//!
//! # Checkout (login required)
//! GET  /checkout                       - Checkout form
//! POST /checkout                       - Save addresses, pick payment option
//! POST /add-coupon                     - Attach a coupon to the cart
//! GET  /payment/{option}               - Payment page
//! POST /payment/stripe                 - Charge the card
//!
//! # Refunds (login required)
//! GET  /request-refund                 - Refund form
//! POST /request-refund                 - Submit refund request
//!
//! # Accounts
//! GET  /accounts/login                 - Login page
//! POST /accounts/login                 - Login action (rate limited)
//! GET  /accounts/signup                - Signup page
//! POST /accounts/signup                - Signup action (rate limited)
//! POST /accounts/logout                - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod payment;
pub mod products;
pub mod refund;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::REFERER},
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use url::Url;

use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Where cart mutations land when there is no usable referer.
pub const CART_FALLBACK_PATH: &str = "/order-summary";

/// Create the account routes router.
///
/// Login and signup submissions share a per-IP rate limiter.
pub fn account_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/logout", post(auth::logout));

    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route_layer(auth_rate_limiter());

    pages.merge(submissions)
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/product/{slug}", get(products::show))
        .route("/add-to-cart/{slug}", post(cart::add_to_cart))
        .route("/remove-from-cart/{slug}", post(cart::remove_from_cart))
        .route(
            "/remove-item-from-cart/{slug}",
            post(cart::remove_single_item_from_cart),
        )
        .route("/order-summary", get(cart::order_summary))
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/add-coupon", post(checkout::add_coupon))
        .route("/payment/stripe", post(payment::submit))
        .route("/payment/{option}", get(payment::show))
        .route("/request-refund", get(refund::show).post(refund::submit))
        .nest("/accounts", account_routes())
}

/// Build the full application: pages, health checks, static files and the
/// middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .fallback(not_found)
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

async fn not_found() -> crate::error::AppError {
    crate::error::AppError::NotFound("no such route".to_owned())
}

/// Redirect to the page the request came from, if it is on this site.
///
/// Only same-origin referers are followed; anything else lands on
/// `fallback`.
#[must_use]
pub fn redirect_back(headers: &HeaderMap, base_url: &str, fallback: &str) -> Redirect {
    Redirect::to(&back_target(headers, base_url).unwrap_or_else(|| fallback.to_owned()))
}

fn back_target(headers: &HeaderMap, base_url: &str) -> Option<String> {
    let referer = headers.get(REFERER)?.to_str().ok()?;
    let referer = Url::parse(referer).ok()?;
    let base = Url::parse(base_url).ok()?;

    if referer.origin() != base.origin() {
        return None;
    }

    let path = referer.path();
    if !is_local_path(path) {
        return None;
    }

    let mut target = path.to_owned();
    if let Some(query) = referer.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

/// Accept a post-login `next` target only if it is a local path.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

/// A path that browsers resolve on this host, not a protocol-relative URL.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    use super::*;

    const BASE: &str = "http://localhost:3000";

    fn referer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_same_origin_referer_is_followed() {
        let headers = referer("http://localhost:3000/?category=2&page=3");
        assert_eq!(
            back_target(&headers, BASE).as_deref(),
            Some("/?category=2&page=3")
        );
    }

    #[test]
    fn test_foreign_referer_is_ignored() {
        assert_eq!(back_target(&referer("https://evil.example/cart"), BASE), None);
        assert_eq!(back_target(&referer("http://localhost:4000/"), BASE), None);
        assert_eq!(back_target(&HeaderMap::new(), BASE), None);
    }

    #[test]
    fn test_protocol_relative_referer_path_is_ignored() {
        let headers = referer("http://localhost:3000//evil.example/x");
        assert_eq!(back_target(&headers, BASE), None);

        let headers = referer("http://localhost:3000/\\evil.example/x");
        assert_eq!(back_target(&headers, BASE), None);

        let response = redirect_back(&headers, BASE, "/order-summary").into_response();
        assert_eq!(response.headers()["location"], "/order-summary");
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/order-summary")), "/order-summary");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
