//! Storage seams for the cache table and the settings store.

use async_trait::async_trait;
use thiserror::Error;

use crate::{CachedProduct, OmitFields, UpsertOutcome};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid stored value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("write rejected for {external_id}: {reason}")]
    Rejected { external_id: String, reason: String },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Mirror of the source catalog, keyed by external id.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Insert the record, or overwrite the row with the same external id.
    async fn upsert(&self, product: &CachedProduct) -> Result<UpsertOutcome, StoreError>;

    async fn get(&self, external_id: &str) -> Result<Option<CachedProduct>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Up to `limit` records starting at `offset`, in first-insertion order.
    async fn list_batch(&self, offset: u64, limit: u64) -> Result<Vec<CachedProduct>, StoreError>;
}

/// Persisted operator settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current omit-fields setting; empty when never saved.
    async fn load_omit_fields(&self) -> Result<OmitFields, StoreError>;

    async fn save_omit_fields(&self, fields: OmitFields) -> Result<(), StoreError>;
}
