//! End-to-end storefront flows against a mocked marketplace backend.
//!
//! Each test builds the real router (sessions included) over a wiremock
//! server standing in for the REST API, then drives it with raw requests.

use std::net::{IpAddr, Ipv4Addr};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devshelf_storefront::config::{MarketplaceApiConfig, StorefrontConfig};
use devshelf_storefront::{middleware, routes, state::AppState};

const TOKEN: &str = "tok-integration-123";
const BEARER: &str = "Bearer tok-integration-123";

fn test_router(api_url: &str) -> Router {
    let config = StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(
            "integration-test-secret-0123456789-abcdefghijklmnop".to_string(),
        ),
        marketplace: MarketplaceApiConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    };

    let session_layer = middleware::create_session_layer(&config);
    let state = AppState::new(config);

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 7,
        "email": "dev@example.com",
        "name": "Dev",
        "role": "buyer",
        "is_active": true,
        "created_at": "2026-01-15T10:30:00"
    })
}

fn product_json() -> serde_json::Value {
    json!({
        "id": 3,
        "seller_id": 2,
        "name": "Log Inspector",
        "slug": "log-inspector",
        "short_description": "Tail and search logs",
        "price": 19.99,
        "product_type": "tool",
        "license_type": "perpetual",
        "status": "active",
        "is_featured": false,
        "download_count": 120,
        "view_count": 900,
        "created_at": "2026-01-10T08:00:00",
        "updated_at": "2026-01-12T08:00:00",
        "average_rating": 4.5,
        "review_count": 12
    })
}

fn empty_cart_json() -> serde_json::Value {
    json!({
        "id": 1,
        "user_id": 7,
        "items": [],
        "subtotal": 0.0,
        "item_count": 0,
        "created_at": "2026-01-15T10:30:00"
    })
}

fn cart_with_item_json() -> serde_json::Value {
    json!({
        "id": 1,
        "user_id": 7,
        "items": [{
            "id": 11,
            "product_id": 3,
            "quantity": 1,
            "product": product_json(),
            "created_at": "2026-01-15T10:35:00"
        }],
        "subtotal": 19.99,
        "item_count": 1,
        "created_at": "2026-01-15T10:30:00"
    })
}

/// Mount the login and whoami mocks every authenticated flow starts with.
async fn mount_login_mocks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

/// Log the session in and return the session cookie.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=dev%40example.com&password=hunter2secret"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    session_cookie(&response)
}

fn session_cookie(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_string(response: Response<axum::body::Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn login_stores_token_and_authenticates_later_requests() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    // The order history only responds to the bearer token issued at login.
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [],
            "total": 0,
            "page": 1,
            "page_size": 10
        })))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/orders")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("not placed any orders"));
}

#[tokio::test]
async fn login_failure_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let response = app
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=dev%40example.com&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("/auth/login?error="));
    assert!(location.contains("Incorrect"));
}

#[tokio::test]
async fn product_listing_renders_backend_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json()],
            "total": 1,
            "page": 1,
            "page_size": 12,
            "total_pages": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let response = app
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Log Inspector"));
    assert!(body.contains("$19.99"));
}

#[tokio::test]
async fn add_to_cart_renders_refetched_count() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    Mock::given(method("POST"))
        .and(path("/cart/items"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "product_id": 3,
            "quantity": 1,
            "product": product_json(),
            "created_at": "2026-01-15T10:35:00"
        })))
        .mount(&server)
        .await;
    // The handler refetches the whole cart after the mutation; the badge
    // reflects this response, not the mutation acknowledgement.
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_item_json()))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/cart/add")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("product_id=3&quantity=1"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Trigger"], "cart-updated");
    let body = body_string(response).await;
    assert!(body.contains('1'));
}

#[tokio::test]
async fn category_filter_renders_category_heading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("category_slug", "dev-tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json()],
            "total": 1,
            "page": 1,
            "page_size": 12,
            "total_pages": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories/slug/dev-tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Developer Tools",
            "slug": "dev-tools",
            "created_at": "2026-01-01T00:00:00",
            "product_count": 1
        })))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let response = app
        .oneshot(
            Request::get("/products?category_slug=dev-tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Developer Tools"));
}

#[tokio::test]
async fn cart_count_badge_reflects_backend_cart() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_item_json()))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());

    // Guests get a zero badge without a backend call.
    let response = app
        .clone()
        .oneshot(Request::get("/cart/count").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains('0'));

    let cookie = login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::get("/cart/count")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains('1'));
}

#[tokio::test]
async fn checkout_with_empty_cart_redirects_back() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_cart_json()))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/checkout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/cart");
}

#[tokio::test]
async fn checkout_places_order_and_redirects_to_it() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    Mock::given(method("POST"))
        .and(path("/orders/checkout"))
        .and(header_eq("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "buyer_id": 7,
            "order_number": "ORD-2026-0042",
            "status": "confirmed",
            "subtotal": 19.99,
            "tax": 2.0,
            "discount": 0.0,
            "total": 21.99,
            "payment_status": "paid",
            "items": [],
            "created_at": "2026-01-15T10:40:00",
            "updated_at": "2026-01-15T10:40:00"
        })))
        .mount(&server)
        .await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/checkout")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "billing_name=Dev&billing_email=dev%40example.com&payment_method=card",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/orders/42");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    // The old cookie no longer authenticates.
    let response = app
        .clone()
        .oneshot(
            Request::get("/orders")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");
}

#[tokio::test]
async fn protected_routes_redirect_guests_to_login() {
    let server = MockServer::start().await;
    let app = test_router(&server.uri());

    for route in ["/orders", "/wishlist", "/checkout", "/account/settings"] {
        let response = app
            .clone()
            .oneshot(Request::get(route).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "route {route}");
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }
}

#[tokio::test]
async fn seller_routes_reject_buyers() {
    let server = MockServer::start().await;
    mount_login_mocks(&server).await;

    let app = test_router(&server.uri());
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/seller")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
