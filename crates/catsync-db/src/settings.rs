//! Database operations for the `settings` table.

use async_trait::async_trait;
use catsync_core::{OmitFields, SettingsStore, StoreError};
use sqlx::PgPool;

use crate::DbError;

/// Option name under which the omit-fields list is stored.
pub const OMIT_FIELDS_KEY: &str = "omit_fields";

/// Read a raw setting value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_setting(pool: &PgPool, name: &str) -> Result<Option<serde_json::Value>, DbError> {
    let value = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT value FROM settings WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(value)
}

/// Insert or replace a setting value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails.
pub async fn put_setting(
    pool: &PgPool,
    name: &str,
    value: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO settings (name, value) VALUES ($1, $2) \
         ON CONFLICT (name) DO UPDATE SET \
             value      = EXCLUDED.value, \
             updated_at = NOW()",
    )
    .bind(name)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Decode a stored omit-fields value. Unknown names are dropped with a warning.
///
/// # Errors
///
/// Returns [`DbError::InvalidValue`] if the value is not a list of strings.
pub fn decode_omit_fields(value: &serde_json::Value) -> Result<OmitFields, DbError> {
    let names: Vec<String> =
        serde_json::from_value(value.clone()).map_err(|e| DbError::InvalidValue {
            key: OMIT_FIELDS_KEY.to_string(),
            reason: e.to_string(),
        })?;
    let (fields, rejected) = OmitFields::parse_lenient(&names);
    if !rejected.is_empty() {
        tracing::warn!(?rejected, "ignoring unknown omit fields in stored settings");
    }
    Ok(fields)
}

/// [`SettingsStore`] backed by the `settings` table.
#[derive(Debug, Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn load_omit_fields(&self) -> Result<OmitFields, StoreError> {
        match get_setting(&self.pool, OMIT_FIELDS_KEY).await? {
            Some(value) => Ok(decode_omit_fields(&value)?),
            None => Ok(OmitFields::empty()),
        }
    }

    async fn save_omit_fields(&self, fields: OmitFields) -> Result<(), StoreError> {
        let value = serde_json::Value::from(fields.names());
        put_setting(&self.pool, OMIT_FIELDS_KEY, &value).await?;
        Ok(())
    }
}
