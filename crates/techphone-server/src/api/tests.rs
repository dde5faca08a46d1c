use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::*;

// ---------------------------------------------------------------------------
// Unit tests (no DB)
// ---------------------------------------------------------------------------

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 20);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(-5)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 100);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn normalize_page_defaults_to_first_page() {
    assert_eq!(normalize_page(None), 1);
    assert_eq!(normalize_page(Some(0)), 1);
    assert_eq!(normalize_page(Some(-3)), 1);
    assert_eq!(normalize_page(Some(7)), 7);
}

#[test]
fn page_offset_saturates_on_huge_pages() {
    assert_eq!(page_offset(1, 20), 0);
    assert_eq!(page_offset(3, 20), 40);
    assert_eq!(page_offset(i64::MAX, normalize_limit(None)), i64::MAX);
    assert_eq!(page_offset(normalize_page(Some(i64::MAX)), 100), i64::MAX);
}

#[test]
fn pagination_rounds_total_pages_up() {
    let p = Pagination::new(1, 20, 41);
    assert_eq!(p.total_pages, 3);

    let p = Pagination::new(2, 20, 40);
    assert_eq!(p.total_pages, 2);

    let p = Pagination::new(1, 20, 0);
    assert_eq!(p.total_pages, 0);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("validation_error", StatusCode::BAD_REQUEST),
        ("conflict", StatusCode::CONFLICT),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new(code, "boom").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn api_error_body_exposes_only_the_message() {
    let body = serde_json::to_value(ApiError::not_found("product not found")).expect("serialize");
    assert_eq!(body, json!({ "error": "product not found" }));
}

#[test]
fn success_envelope_omits_absent_fields() {
    let body = serde_json::to_value(ApiResponse::new(vec![1, 2, 3])).expect("serialize");
    assert_eq!(body, json!({ "data": [1, 2, 3] }));

    let body = serde_json::to_value(ApiResponse::with_pagination(
        Vec::<i32>::new(),
        0,
        Pagination::new(1, 20, 0),
    ))
    .expect("serialize");
    assert_eq!(body["count"], json!(0));
    assert_eq!(body["pagination"]["total_pages"], json!(0));
}

#[test]
fn validation_error_converts_to_bad_request() {
    let err = techphone_core::validation::validate_email("not-an-email").unwrap_err();
    let api_err = ApiError::from(err);
    let response = api_err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Route tests
// ---------------------------------------------------------------------------

fn test_app(pool: sqlx::PgPool) -> Router {
    let auth = crate::middleware::AuthState::from_env(true).expect("auth");
    // Zero cache capacity so each request hits the database.
    let state = AppState::new(pool, Duration::from_secs(0), 0);
    build_app(state, auth, default_rate_limit_state())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}

async fn seed_product(pool: &sqlx::PgPool, name: &str, category: &str, brand: &str, price: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (name, price, category, brand, stock) \
         VALUES ($1, $2, $3, $4, 10) RETURNING id",
    )
    .bind(name)
    .bind(rust_decimal::Decimal::from(price))
    .bind(category)
    .bind(brand)
    .fetch_one(pool)
    .await
    .expect("insert product")
}

async fn seed_order(pool: &sqlx::PgPool, number: &str, user_id: Option<Uuid>, status: &str, total: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO orders (order_number, user_id, total_amount, status, \
             customer_name, customer_email, customer_phone, customer_address) \
         VALUES ($1, $2, $3, $4, 'Nguyễn Văn A', 'a@example.com', '0912345678', '1 Lê Lợi, Q1') \
         RETURNING id",
    )
    .bind(number)
    .bind(user_id)
    .bind(rust_decimal::Decimal::from(total))
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("insert order")
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_ok_with_live_database(pool: sqlx::PgPool) {
    let response = test_app(pool).oneshot(get("/api/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["database"], json!("ok"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_listing_matches_category_variants(pool: sqlx::PgPool) {
    seed_product(&pool, "iPhone 15", "Phones", "Apple", 19_990_000).await;
    seed_product(&pool, "Galaxy S24", "phone", "Samsung", 17_990_000).await;
    seed_product(&pool, "iPad Air", "tablet", "Apple", 14_990_000).await;

    let response = test_app(pool)
        .oneshot(get("/api/products?category=phones"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names.len(), 2, "singular and plural spellings both match");
    assert!(names.contains(&"iPhone 15"));
    assert!(names.contains(&"Galaxy S24"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_listing_paginates_with_stable_totals(pool: sqlx::PgPool) {
    for i in 1..=3 {
        seed_product(&pool, &format!("Product {i}"), "phone", "Apple", 1_000_000).await;
    }

    let response = test_app(pool)
        .oneshot(get("/api/products?limit=2&page=2"))
        .await
        .expect("response");
    let json = body_json(response).await;

    assert_eq!(json["data"].as_array().expect("data").len(), 1);
    assert_eq!(json["count"], json!(3));
    assert_eq!(json["pagination"]["total"], json!(3));
    assert_eq!(json["pagination"]["total_pages"], json!(2));
    assert_eq!(json["pagination"]["page"], json!(2));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_listing_survives_absurd_page_numbers(pool: sqlx::PgPool) {
    seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;

    let response = test_app(pool)
        .oneshot(get("/api/products?page=9223372036854775807"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().expect("data").len(), 0, "page is past the end");
    assert_eq!(json["count"], json!(1));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_search_requires_a_keyword(pool: sqlx::PgPool) {
    let response = test_app(pool)
        .oneshot(get("/api/products/search"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().expect("error").starts_with("Vui lòng nhập"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_search_matches_brand_substring(pool: sqlx::PgPool) {
    seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    seed_product(&pool, "Galaxy S24", "phone", "Samsung", 17_990_000).await;

    let response = test_app(pool)
        .oneshot(get("/api/products/search?q=sams"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["count"], json!(1));
    assert_eq!(json["data"][0]["name"], json!("Galaxy S24"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn soft_deleted_product_reads_as_absent(pool: sqlx::PgPool) {
    let id = seed_product(&pool, "Old Model", "phone", "Nokia", 990_000).await;
    sqlx::query("UPDATE products SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .expect("soft delete");

    let app = test_app(pool);
    let response = app
        .clone()
        .oneshot(get(&format!("/api/products/{id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/products")).await.expect("response");
    let json = body_json(response).await;
    assert_eq!(json["count"], json!(0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_product_rejects_duplicate_names(pool: sqlx::PgPool) {
    let app = test_app(pool);
    let body = json!({
        "name": "iPhone 15 Pro",
        "price": "29990000",
        "category": "phone",
        "brand": "Apple",
        "stock": 5
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/products", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("POST", "/api/products", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_product_rejects_out_of_range_discount(pool: sqlx::PgPool) {
    let body = json!({
        "name": "iPhone 15 Pro",
        "price": "29990000",
        "category": "phone",
        "discount": 120
    });
    let response = test_app(pool)
        .oneshot(json_request("POST", "/api/products", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_product_is_sparse(pool: sqlx::PgPool) {
    let id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;

    let response = test_app(pool)
        .oneshot(json_request(
            "PUT",
            &format!("/api/products/{id}"),
            &json!({ "discount": 15 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["discount"], json!(15));
    assert_eq!(json["data"]["name"], json!("iPhone 15"), "untouched field survives");
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_product_removes_it_from_listings(pool: sqlx::PgPool) {
    let id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/products/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/products")).await.expect("response");
    let json = body_json(response).await;
    assert_eq!(json["count"], json!(0));
}

fn checkout_body(product_id: i64) -> Value {
    json!({
        "items": [
            { "product_id": product_id, "quantity": 2, "price": "19990000" }
        ],
        "total_amount": "39980000",
        "shipping_fee": "30000",
        "payment_method": "cod",
        "customer_name": "Nguyễn Văn A",
        "customer_email": "a@example.com",
        "customer_phone": "0912345678",
        "customer_address": "1 Lê Lợi, Q1, TP.HCM"
    })
}

#[sqlx::test(migrations = "../../migrations")]
async fn guest_checkout_persists_order_and_items(pool: sqlx::PgPool) {
    let product_id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", &checkout_body(product_id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let order_number = json["data"]["order_number"].as_str().expect("order_number");
    assert!(order_number.starts_with("DDV-"));
    assert_eq!(json["data"]["status"], json!("pending"));
    assert_eq!(json["data"]["items"].as_array().expect("items").len(), 1);
    assert_eq!(json["data"]["items"][0]["quantity"], json!(2));

    let id = json["data"]["id"].as_i64().expect("id");
    let response = app
        .oneshot(get(&format!("/api/orders/{id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["order_number"], json!(order_number));
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_rejects_invalid_phone(pool: sqlx::PgPool) {
    let product_id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    let mut body = checkout_body(product_id);
    body["customer_phone"] = json!("12345");

    let response = test_app(pool)
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], json!("Số điện thoại không hợp lệ"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_rejects_empty_cart(pool: sqlx::PgPool) {
    let product_id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    let mut body = checkout_body(product_id);
    body["items"] = json!([]);

    let response = test_app(pool)
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_listing_filters_by_user_and_status(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    seed_order(&pool, "DDV-20260830-AAAAAA", Some(user), "pending", 1_000_000).await;
    seed_order(&pool, "DDV-20260830-BBBBBB", Some(user), "delivered", 2_000_000).await;
    seed_order(&pool, "DDV-20260830-CCCCCC", None, "pending", 3_000_000).await;

    let response = test_app(pool)
        .oneshot(get(&format!("/api/orders?user_id={user}&status=pending")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["count"], json!(1));
    assert_eq!(json["data"][0]["order_number"], json!("DDV-20260830-AAAAAA"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_status_update_rejects_unknown_values(pool: sqlx::PgPool) {
    let id = seed_order(&pool, "DDV-20260830-AAAAAA", None, "pending", 1_000_000).await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/orders/{id}/status"),
            &json!({ "status": "shipped" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/orders/{id}/status"),
            &json!({ "status": "processing", "payment_status": "paid" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], json!("processing"));
    assert_eq!(json["data"]["payment_status"], json!("paid"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn user_order_stats_aggregate_by_status(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    seed_order(&pool, "DDV-20260830-AAAAAA", Some(user), "delivered", 2_000_000).await;
    seed_order(&pool, "DDV-20260830-BBBBBB", Some(user), "completed", 3_000_000).await;
    seed_order(&pool, "DDV-20260830-CCCCCC", Some(user), "cancelled", 9_000_000).await;
    seed_order(&pool, "DDV-20260830-DDDDDD", None, "delivered", 5_000_000).await;

    let response = test_app(pool)
        .oneshot(get(&format!("/api/orders/stats/{user}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total_orders"], json!(3));
    assert_eq!(json["data"]["delivered"], json!(1));
    assert_eq!(json["data"]["cancelled"], json!(1));
    // Cancelled orders do not count toward spend.
    assert_eq!(json["data"]["total_spent"], json!("5000000.00"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn profile_upsert_promotes_allowlisted_admin(pool: sqlx::PgPool) {
    let response = test_app(pool)
        .oneshot(json_request(
            "POST",
            "/api/profiles",
            &json!({
                "id": Uuid::new_v4(),
                "email": "admin@techphone.vn",
                "full_name": "Quản trị viên",
                "role": "user"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], json!("admin"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn last_login_demotes_stale_admin(pool: sqlx::PgPool) {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO profiles (id, email, full_name, role) \
         VALUES ($1, 'cu@example.com', 'Cựu Quản Trị', 'admin')",
    )
    .bind(id)
    .execute(&pool)
    .await
    .expect("insert profile");

    let response = test_app(pool)
        .oneshot(json_request(
            "PUT",
            &format!("/api/profiles/{id}/last-login"),
            &json!({}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], json!("user"), "de-listed admin is demoted");
    assert!(json["data"]["last_login"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_stats_count_live_rows(pool: sqlx::PgPool) {
    let id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    seed_product(&pool, "Galaxy S24", "phone", "Samsung", 17_990_000).await;
    sqlx::query("UPDATE products SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .expect("soft delete");
    seed_order(&pool, "DDV-20260830-AAAAAA", None, "delivered", 2_000_000).await;
    seed_order(&pool, "DDV-20260830-BBBBBB", None, "pending", 1_000_000).await;

    let response = test_app(pool)
        .oneshot(get("/api/admin/stats"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["active_products"], json!(1));
    assert_eq!(json["data"]["total_orders"], json!(2));
    assert_eq!(json["data"]["pending_orders"], json!(1));
    assert_eq!(json["data"]["delivered_orders"], json!(1));
    assert_eq!(json["data"]["revenue"], json!("2000000.00"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_product_id_is_not_found(pool: sqlx::PgPool) {
    let response = test_app(pool)
        .oneshot(get("/api/products/999999"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], json!("product not found"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn responses_carry_a_request_id_header(pool: sqlx::PgPool) {
    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "test-id-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("test-id-123")
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn protected_routes_require_a_bearer_token(pool: sqlx::PgPool) {
    let auth = AuthState::from_keys(std::collections::HashSet::from(["khoa-bi-mat".to_string()]));
    let state = AppState::new(pool, Duration::from_secs(0), 0);
    let app = build_app(state, auth, default_rate_limit_state());

    let response = app
        .clone()
        .oneshot(get("/api/orders"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], json!("missing or invalid bearer token"));

    // Catalog reads stay public even with auth enabled.
    let response = app
        .clone()
        .oneshot(get("/api/products"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .header(header::AUTHORIZATION, "Bearer khoa-bi-mat")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../migrations")]
async fn exhausted_rate_limit_returns_429(pool: sqlx::PgPool) {
    let auth = AuthState::from_keys(std::collections::HashSet::new());
    let state = AppState::new(pool, Duration::from_secs(0), 0);
    let app = build_app(state, auth, RateLimitState::new(1, Duration::from_secs(60)));

    let response = app
        .clone()
        .oneshot(get("/api/orders"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/orders")).await.expect("response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["error"], json!("rate limit exceeded"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_write_invalidates_cached_product_listings(pool: sqlx::PgPool) {
    let product_id = seed_product(&pool, "iPhone 15", "phone", "Apple", 19_990_000).await;
    let auth = crate::middleware::AuthState::from_env(true).expect("auth");
    let state = AppState::new(pool.clone(), Duration::from_secs(60), 8);
    let app = build_app(state, auth, default_rate_limit_state());

    let response = app.clone().oneshot(get("/api/products")).await.expect("response");
    assert_eq!(body_json(response).await["count"], json!(1));

    // A row inserted behind the cache's back is not visible yet.
    seed_product(&pool, "Galaxy S24", "phone", "Samsung", 17_990_000).await;
    let response = app.clone().oneshot(get("/api/products")).await.expect("response");
    assert_eq!(body_json(response).await["count"], json!(1));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", &checkout_body(product_id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/products")).await.expect("response");
    assert_eq!(body_json(response).await["count"], json!(2));
}
