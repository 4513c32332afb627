//! Integration tests for `WooClient` and `ImageFetcher` against `wiremock`.

use catsync_commerce::{
    AttributeSpec, CommerceCatalog, CommerceError, ImageError, ImageFetcher, ImageFile, ImageKind,
    MediaLibrary, Product, ProductKind, Variation, WooClient,
};
use catsync_core::CommerceCredentials;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn test_client(server: &MockServer) -> WooClient {
    WooClient::new(
        &CommerceCredentials {
            base_url: server.uri(),
            username: "ck_test".to_string(),
            password: "cs_test".to_string(),
        },
        5,
        "catsync-test/0.1",
    )
    .expect("failed to build test WooClient")
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_product_by_sku_returns_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products"))
        .and(query_param("sku", "ZC-1"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 41, "type": "simple", "sku": "ZC-1", "name": "Mug", "regular_price": "10.00"}
        ])))
        .mount(&server)
        .await;

    let found = test_client(&server)
        .find_product_by_sku("ZC-1")
        .await
        .expect("lookup should succeed")
        .expect("product should exist");
    assert_eq!(found.id, Some(41));
    assert_eq!(found.kind, ProductKind::Simple);
}

#[tokio::test]
async fn find_product_by_sku_returns_none_for_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let found = test_client(&server).find_product_by_sku("nope").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn save_product_posts_new_and_puts_existing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products"))
        .and(body_partial_json(json!({"type": "variable", "sku": "ZC-2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 100, "sku": "ZC-2"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 100, "sku": "ZC-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut product = Product::new(ProductKind::Variable, "ZC-2");
    let id = client.save_product(&product).await.expect("create");
    assert_eq!(id, 100);

    product.id = Some(id);
    assert_eq!(client.save_product(&product).await.expect("update"), 100);
}

#[tokio::test]
async fn api_error_body_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "product_invalid_sku",
            "message": "Invalid or duplicated SKU.",
            "data": {"status": 400}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .save_product(&Product::new(ProductKind::Simple, "dup"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CommerceError::Api { status: 400, ref code, .. } if code == "product_invalid_sku"),
        "expected Api error, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Variations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn variation_lookup_and_create_are_scoped_to_parent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/100/variations"))
        .and(query_param("sku", "901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products/100/variations"))
        .and(body_partial_json(json!({"sku": "901", "manage_stock": true})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7001})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.find_variation_by_sku(100, "901").await.unwrap().is_none());

    let mut variation = Variation::new(100, "901");
    variation.manage_stock = Some(true);
    variation.stock_quantity = Some(5);
    assert_eq!(client.save_variation(&variation).await.unwrap(), 7001);
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ensure_category_reuses_exact_name_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/categories"))
        .and(query_param("search", "Mugs & Cups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "name": "Mugs &amp; Cups Deluxe", "slug": "mugs-cups-deluxe"},
            {"id": 4, "name": "Mugs &amp; Cups", "slug": "mugs-cups"}
        ])))
        .mount(&server)
        .await;

    let id = test_client(&server)
        .ensure_category("Mugs & Cups")
        .await
        .unwrap();
    assert_eq!(id, 4);
}

#[tokio::test]
async fn ensure_category_creates_when_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products/categories"))
        .and(body_partial_json(json!({"name": "Bags"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12, "name": "Bags", "slug": "bags"})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(test_client(&server).ensure_category("Bags").await.unwrap(), 12);
}

#[tokio::test]
async fn ensure_term_uses_resource_id_from_term_exists() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/attributes/2/terms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products/attributes/2/terms"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "term_exists",
            "message": "A term with the name provided already exists.",
            "data": {"status": 400, "resource_id": 88}
        })))
        .mount(&server)
        .await;

    let attribute = catsync_commerce::Attribute {
        id: 2,
        name: "Color".to_string(),
        slug: "color".to_string(),
    };
    let term = test_client(&server)
        .ensure_term(&attribute, "Red")
        .await
        .unwrap();
    assert_eq!(term.id, 88);
    assert_eq!(term.name, "Red");
}

#[tokio::test]
async fn ensure_attribute_matches_taxonomy_slug() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Size", "slug": "pa_size"},
            {"id": 2, "name": "Color", "slug": "pa_color"}
        ])))
        .mount(&server)
        .await;

    let attribute = test_client(&server)
        .ensure_attribute(&AttributeSpec::new("color", "Color"))
        .await
        .unwrap();
    assert_eq!(attribute.id, 2);
}

#[tokio::test]
async fn ensure_attribute_creates_select_attribute() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/products/attributes"))
        .and(body_partial_json(json!({
            "name": "Color 2",
            "slug": "color2",
            "type": "select",
            "order_by": "menu_order",
            "has_archives": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5, "name": "Color 2", "slug": "pa_color2"})))
        .expect(1)
        .mount(&server)
        .await;

    let attribute = test_client(&server)
        .ensure_attribute(&AttributeSpec::new("color2", "Color 2"))
        .await
        .unwrap();
    assert_eq!(attribute.id, 5);
    assert_eq!(attribute.slug, "color2");
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_image_sends_raw_body_with_disposition() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/media"))
        .and(header("content-type", "image/png"))
        .and(header("content-disposition", "attachment; filename=\"mug.png\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 501})))
        .expect(1)
        .mount(&server)
        .await;

    let image = ImageFile {
        filename: "mug.png".to_string(),
        kind: ImageKind::Png,
        bytes: PNG_HEADER.to_vec(),
    };
    assert_eq!(test_client(&server).upload_image(&image).await.unwrap(), 501);
}

#[tokio::test]
async fn image_fetcher_downloads_and_validates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/mug.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_HEADER.to_vec()))
        .mount(&server)
        .await;

    let fetcher = ImageFetcher::new(5, "catsync-test/0.1").unwrap();
    let file = fetcher
        .fetch(&format!("{}/img/mug.png", server.uri()))
        .await
        .expect("image should download");
    assert_eq!(file.filename, "mug.png");
    assert_eq!(file.kind, ImageKind::Png);
}

#[tokio::test]
async fn image_fetcher_rejects_missing_image() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ImageFetcher::new(5, "catsync-test/0.1").unwrap();
    let err = fetcher
        .fetch(&format!("{}/img/gone.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::UnexpectedStatus { status: 404, .. }));
}

#[tokio::test]
async fn saving_a_fetched_product_does_not_resend_its_gallery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/v3/products"))
        .and(query_param("sku", "ZC-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 60,
            "type": "simple",
            "sku": "ZC-3",
            "name": "Bag",
            "images": [{"id": 11}, {"id": 12}, {"id": 13}]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/products/60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 60})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut product = client
        .find_product_by_sku("ZC-3")
        .await
        .expect("lookup should succeed")
        .expect("product should exist");
    assert_eq!(product.image_id, Some(11));
    product.name = "Bag v2".to_string();
    client.save_product(&product).await.expect("save should succeed");

    let requests = server.received_requests().await.expect("recorded requests");
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("product PUT");
    let body: serde_json::Value = serde_json::from_slice(&put.body).expect("json body");
    assert_eq!(body["name"], "Bag v2");
    assert!(body.get("images").is_none(), "images sent: {body}");
}
