//! Database operations for the `source_products` cache table.

use async_trait::async_trait;
use catsync_core::{CacheStore, CachedProduct, StoreError, UpsertOutcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `source_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceProductRow {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub unit_weight: Option<i32>,
    pub height: Option<i32>,
    pub length: Option<i32>,
    pub families: serde_json::Value,
    pub images: serde_json::Value,
    pub products: serde_json::Value,
    pub subattributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SourceProductRow> for CachedProduct {
    fn from(row: SourceProductRow) -> Self {
        Self {
            external_id: row.external_id,
            name: row.name,
            description: row.description,
            price: row.price,
            currency: row.currency,
            minimum_order_quantity: row.minimum_order_quantity,
            unit_weight: row.unit_weight,
            height: row.height,
            length: row.length,
            families: row.families,
            images: row.images,
            products: row.products,
            subattributes: row.subattributes,
        }
    }
}

const SELECT_COLUMNS: &str = "id, external_id, name, description, price, currency, \
     minimum_order_quantity, unit_weight, height, length, \
     families, images, products, subattributes, created_at, updated_at";

// ---------------------------------------------------------------------------
// source_products operations
// ---------------------------------------------------------------------------

/// Upserts a cached product keyed by `external_id`.
///
/// Conflicts overwrite every data column and bump `updated_at`; `id` and
/// `created_at` are preserved so batch order stays stable across re-fetches.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_source_product(
    pool: &PgPool,
    product: &CachedProduct,
) -> Result<UpsertOutcome, DbError> {
    // xmax is zero only for a freshly inserted tuple.
    let inserted: bool = sqlx::query_scalar::<_, bool>(
        "INSERT INTO source_products \
             (external_id, name, description, price, currency, \
              minimum_order_quantity, unit_weight, height, length, \
              families, images, products, subattributes) \
         VALUES ($1, $2, $3, $4, $5, \
                 $6, $7, $8, $9, \
                 $10, $11, $12, $13) \
         ON CONFLICT (external_id) DO UPDATE SET \
             name                   = EXCLUDED.name, \
             description            = EXCLUDED.description, \
             price                  = EXCLUDED.price, \
             currency               = EXCLUDED.currency, \
             minimum_order_quantity = EXCLUDED.minimum_order_quantity, \
             unit_weight            = EXCLUDED.unit_weight, \
             height                 = EXCLUDED.height, \
             length                 = EXCLUDED.length, \
             families               = EXCLUDED.families, \
             images                 = EXCLUDED.images, \
             products               = EXCLUDED.products, \
             subattributes          = EXCLUDED.subattributes, \
             updated_at             = NOW() \
         RETURNING (xmax = 0)",
    )
    .bind(&product.external_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.currency)
    .bind(product.minimum_order_quantity)
    .bind(product.unit_weight)
    .bind(product.height)
    .bind(product.length)
    .bind(&product.families)
    .bind(&product.images)
    .bind(&product.products)
    .bind(&product.subattributes)
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Updated
    })
}

/// Fetch one cached product by external id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_source_product(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<SourceProductRow>, DbError> {
    let row = sqlx::query_as::<_, SourceProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM source_products WHERE external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_source_products(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM source_products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// List a window of cached products ordered by `id` (first-insertion order).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_source_products(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<SourceProductRow>, DbError> {
    let rows = sqlx::query_as::<_, SourceProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM source_products ORDER BY id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CacheStore implementation
// ---------------------------------------------------------------------------

/// [`CacheStore`] backed by the `source_products` table.
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn upsert(&self, product: &CachedProduct) -> Result<UpsertOutcome, StoreError> {
        Ok(upsert_source_product(&self.pool, product).await?)
    }

    async fn get(&self, external_id: &str) -> Result<Option<CachedProduct>, StoreError> {
        Ok(get_source_product(&self.pool, external_id)
            .await?
            .map(CachedProduct::from))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = count_source_products(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list_batch(&self, offset: u64, limit: u64) -> Result<Vec<CachedProduct>, StoreError> {
        let rows = list_source_products(&self.pool, to_i64(offset), to_i64(limit)).await?;
        Ok(rows.into_iter().map(CachedProduct::from).collect())
    }
}
