//! Live integration tests for catsync-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use catsync_core::{
    CacheStore, CachedProduct, OmitField, OmitFields, SettingsStore, UpsertOutcome,
};
use catsync_db::{
    count_source_products, get_setting, list_source_products, put_setting,
    upsert_source_product, PgCacheStore, PgSettingsStore, OMIT_FIELDS_KEY,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_product(external_id: &str, name: &str) -> CachedProduct {
    CachedProduct {
        external_id: external_id.to_string(),
        name: name.to_string(),
        description: Some("desc".to_string()),
        price: Some(rust_decimal::Decimal::new(990, 2)),
        currency: Some("CLP".to_string()),
        minimum_order_quantity: Some(10),
        unit_weight: Some(200),
        height: Some(10),
        length: Some(5),
        families: json!([{"description": "Mugs"}]),
        images: json!([]),
        products: json!([{"id": 1, "stock": 4}]),
        subattributes: json!([]),
    }
}

// ---------------------------------------------------------------------------
// source_products
// ---------------------------------------------------------------------------

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn upsert_twice_keeps_one_row(pool: sqlx::PgPool) {
    let first = upsert_source_product(&pool, &make_product("A-1", "first"))
        .await
        .expect("first upsert");
    let second = upsert_source_product(&pool, &make_product("A-1", "second"))
        .await
        .expect("second upsert");

    assert_eq!(first, UpsertOutcome::Inserted);
    assert_eq!(second, UpsertOutcome::Updated);
    assert_eq!(count_source_products(&pool).await.expect("count"), 1);

    let rows = list_source_products(&pool, 0, 10).await.expect("list");
    assert_eq!(rows[0].name, "second");
}

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn list_batch_follows_first_insertion_order(pool: sqlx::PgPool) {
    let store = PgCacheStore::new(pool);
    for id in ["c", "a", "b"] {
        store.upsert(&make_product(id, id)).await.expect("upsert");
    }
    // Re-fetching an early row must not move it to the end.
    store
        .upsert(&make_product("c", "refreshed"))
        .await
        .expect("re-upsert");

    let batch = store.list_batch(0, 2).await.expect("list");
    let ids: Vec<_> = batch.iter().map(|p| p.external_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a"]);
    assert_eq!(store.count().await.expect("count"), 3);
    assert!(store.get("b").await.expect("get").is_some());
    assert!(store.get("zzz").await.expect("get").is_none());
}

// ---------------------------------------------------------------------------
// settings
// ---------------------------------------------------------------------------

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn omit_fields_round_trip(pool: sqlx::PgPool) {
    let store = PgSettingsStore::new(pool.clone());
    assert!(store.load_omit_fields().await.expect("load").is_empty());

    let fields: OmitFields = [OmitField::Price, OmitField::Image].into_iter().collect();
    store.save_omit_fields(fields).await.expect("save");

    assert_eq!(store.load_omit_fields().await.expect("reload"), fields);
    assert_eq!(
        get_setting(&pool, OMIT_FIELDS_KEY).await.expect("raw"),
        Some(json!(["price", "image"]))
    );
}

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn stored_unknown_fields_are_ignored(pool: sqlx::PgPool) {
    put_setting(&pool, OMIT_FIELDS_KEY, &json!(["stock", "legacy_field"]))
        .await
        .expect("put");
    let store = PgSettingsStore::new(pool);
    assert_eq!(
        store.load_omit_fields().await.expect("load").names(),
        vec!["stock"]
    );
}
