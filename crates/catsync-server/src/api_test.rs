use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use catsync_commerce::{ImageFetcher, MemoryCatalog};
use catsync_core::{
    CacheStore, MemoryCacheStore, MemorySettingsStore, OmitField, OmitFields, SettingsStore,
    Severity,
};
use catsync_source::SourceClient;
use catsync_sync::{LogSink, SyncContext};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::error_log::normalize_limit;
use super::*;
use crate::middleware::AuthState;

struct TestApp {
    cache: Arc<MemoryCacheStore>,
    settings: Arc<MemorySettingsStore>,
    sync: Arc<SyncContext>,
    state: AppState,
}

/// Pool pointing at a closed port; every query fails quickly.
fn unreachable_pool() -> sqlx::PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://catsync@127.0.0.1:1/catsync")
        .expect("lazy pool")
}

fn test_app(source_base: &str, commerce: bool) -> TestApp {
    let cache = Arc::new(MemoryCacheStore::new());
    let settings = Arc::new(MemorySettingsStore::default());
    let source = SourceClient::new(source_base, 5, "catsync-test/0.1").expect("source client");
    let images = ImageFetcher::new(5, "catsync-test/0.1").expect("image fetcher");
    let log_path =
        std::env::temp_dir().join(format!("catsync-api-{}.log", uuid::Uuid::new_v4()));
    let sink = Arc::new(LogSink::new(log_path, Severity::Info));

    let mut ctx = SyncContext::new(cache.clone(), settings.clone(), source, images, sink);
    if commerce {
        let catalog = Arc::new(MemoryCatalog::new());
        ctx = ctx.with_commerce(catalog.clone(), catalog);
    }
    let sync = Arc::new(ctx);

    TestApp {
        cache,
        settings,
        sync: Arc::clone(&sync),
        state: AppState {
            pool: unreachable_pool(),
            sync,
        },
    }
}

fn open_auth() -> AuthState {
    AuthState::from_keys("", true).expect("dev auth")
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn json_request(http_method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn pen() -> Value {
    json!({
        "external_id": "ZC-PEN",
        "name": "Pen",
        "price": 790,
        "families": [{"description": "Writing"}],
        "products": [{"id": 700, "stock": 40}]
    })
}

async fn seed_pen(cache: &MemoryCacheStore) {
    let generic: catsync_source::GenericProduct =
        serde_json::from_value(pen()).expect("generic product");
    let record = catsync_source::normalize_product(generic).expect("normalize");
    cache.upsert(&record).await.expect("upsert");
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(-4)), 1);
    assert_eq!(normalize_limit(Some(10_000)), 500);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("not_configured", StatusCode::SERVICE_UNAVAILABLE),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[test]
fn sync_errors_map_to_api_codes() {
    let not_configured = map_sync_error("r".into(), &SyncError::CommerceNotConfigured);
    assert_eq!(not_configured.error.code, "not_configured");

    let missing = map_sync_error(
        "r".into(),
        &SyncError::Source(SourceError::NotFound {
            url: "http://source/ZC-1".to_string(),
        }),
    );
    assert_eq!(missing.error.code, "not_found");

    let upstream = map_sync_error(
        "r".into(),
        &SyncError::Source(SourceError::PaginationLimit { max_pages: 1000 }),
    );
    assert_eq!(upstream.error.code, "upstream_error");

    let store = map_sync_error(
        "r".into(),
        &SyncError::Store(catsync_core::StoreError::backend(std::io::Error::other(
            "disk gone",
        ))),
    );
    assert_eq!(store.error.code, "internal_error");
    assert_eq!(store.error.message, "storage operation failed");
}

// ---------------------------------------------------------------------------
// Health and auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_when_database_unreachable() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
    assert_eq!(json["data"]["database"], "unavailable");
    assert_eq!(json["data"]["commerce"], "not_configured");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let app = build_app(t.state, open_auth());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/products/total")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
}

#[tokio::test]
async fn protected_route_rejects_missing_token_and_logs_attempt() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let auth = AuthState::from_keys("secret-key", false).expect("auth");
    let app = build_app(t.state, auth);

    let (status, json) = send(app, get("/api/v1/settings")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let entries = t.sync.sink().recent(10).await.expect("log entries");
    assert!(entries.iter().any(|e| e.severity == "WARNING"
        && e.message == "Unauthorized access attempt: GET /api/v1/settings"));
}

#[tokio::test]
async fn protected_route_accepts_valid_token() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let auth = AuthState::from_keys("secret-key", false).expect("auth");
    let app = build_app(t.state, auth);

    let req = Request::builder()
        .uri("/api/v1/settings")
        .header("authorization", "Bearer secret-key")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_round_trip_drops_unknown_names() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app.clone(),
        json_request(
            "PUT",
            "/api/v1/settings/omit-fields",
            &json!({"omit_fields": ["price", "Image", "colour"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["saved"], true);
    assert_eq!(json["data"]["omit_fields"], json!(["price", "image"]));
    assert_eq!(json["data"]["ignored"], json!(["colour"]));

    let stored = t.settings.load_omit_fields().await.expect("load");
    assert_eq!(
        stored,
        OmitFields::empty()
            .with(OmitField::Price)
            .with(OmitField::Image)
    );

    let (status, json) = send(app, get("/api/v1/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["omit_fields"], json!(["price", "image"]));

    let entries = t.sync.sink().recent(10).await.expect("log entries");
    assert!(entries
        .iter()
        .any(|e| e.severity == "WARNING" && e.message.contains("colour")));
}

#[tokio::test]
async fn settings_put_rejects_malformed_body() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    let app = build_app(t.state, open_auth());

    let (status, _) = send(
        app,
        json_request(
            "PUT",
            "/api/v1/settings/omit-fields",
            &json!({"fields": "price"}),
        ),
    )
    .await;
    assert!(status.is_client_error(), "got {status}");
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn total_counts_cached_products() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    seed_pen(&t.cache).await;
    let app = build_app(t.state, open_auth());

    let (status, json) = send(app, get("/api/v1/products/total")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_products"], 1);
}

#[tokio::test]
async fn fetch_endpoint_fills_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generic_product"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"generic_products": [pen()], "total_pages": 1})),
        )
        .mount(&server)
        .await;

    let t = test_app(&format!("{}/generic_product", server.uri()), false);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/products/fetch")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["inserted"], 1);
    assert_eq!(json["data"]["updated"], 0);
    assert_eq!(t.cache.count().await.expect("count"), 1);
}

#[tokio::test]
async fn fetch_endpoint_maps_source_failure_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generic_product"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let t = test_app(&format!("{}/generic_product", server.uri()), false);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/products/fetch")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn import_without_commerce_is_service_unavailable() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    seed_pen(&t.cache).await;
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        json_request("POST", "/api/v1/products/import", &json!({"offset": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn import_on_empty_cache_is_complete() {
    let t = test_app("http://127.0.0.1:1/generic_product", true);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/products/import")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["imported"], 0);
    assert_eq!(json["data"]["is_complete"], true);
    assert_eq!(json["data"]["total_products"], 0);
}

#[tokio::test]
async fn import_reports_batch_progress() {
    let t = test_app("http://127.0.0.1:1/generic_product", true);
    seed_pen(&t.cache).await;
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        json_request("POST", "/api/v1/products/import", &json!({"offset": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["imported"], 1);
    assert_eq!(json["data"]["errors"], json!([]));
    assert_eq!(json["data"]["is_complete"], true);
}

#[tokio::test]
async fn refresh_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generic_product/ZC-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let t = test_app(&format!("{}/generic_product", server.uri()), true);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/products/ZC-404/refresh")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn refresh_reconciles_single_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generic_product/ZC-PEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generic_product": pen()})))
        .mount(&server)
        .await;

    let t = test_app(&format!("{}/generic_product", server.uri()), true);
    let app = build_app(t.state, open_auth());

    let (status, json) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/products/ZC-PEN/refresh")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["outcome"]["external_id"], "ZC-PEN");
    assert_eq!(t.cache.count().await.expect("count"), 1);
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn log_endpoint_returns_newest_first() {
    let t = test_app("http://127.0.0.1:1/generic_product", false);
    t.sync.sink().info("first entry").await;
    t.sync.sink().error("second entry").await;
    let app = build_app(t.state, open_auth());

    let (status, json) = send(app, get("/api/v1/log?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = json["data"].as_array().expect("data array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["severity"], "ERROR");
    assert_eq!(entries[0]["message"], "second entry");
}
