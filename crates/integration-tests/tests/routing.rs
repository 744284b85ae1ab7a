//! In-process routing tests for both binaries.
//!
//! These requests stop before any query runs, so the lazy pool never
//! connects and no database is needed.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use wardrobe_integration_tests::{admin_app, storefront_app};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn storefront_health_is_ok() {
    let response = storefront_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn cart_requires_login_and_remembers_page() {
    let response = storefront_app().oneshot(get("/order-summary")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login?next=%2Forder-summary");
}

#[tokio::test]
async fn checkout_post_requires_login() {
    let response = storefront_app()
        .oneshot(post("/add-coupon", "code=SPRING10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login?next=%2F");
}

#[tokio::test]
async fn storefront_sets_security_headers() {
    let response = storefront_app().oneshot(get("/health")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn admin_health_is_ok() {
    let response = admin_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_pages_require_staff_login() {
    for uri in ["/", "/orders", "/items/new", "/refunds", "/order-items"] {
        let response = admin_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }
}

#[tokio::test]
async fn admin_actions_require_staff_login() {
    let response = admin_app()
        .oneshot(post("/orders/bulk", "action=grant_refund&selected=1,2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn admin_login_page_renders() {
    let response = admin_app().oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store, max-age=0"
    );

    let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("action=\"/login\""));
}
