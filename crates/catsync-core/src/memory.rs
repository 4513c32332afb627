//! In-process store implementations, used by tests and dry runs.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{CacheStore, CachedProduct, OmitFields, SettingsStore, StoreError, UpsertOutcome};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache store backed by a `Vec`, preserving first-insertion order.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    rows: Mutex<Vec<CachedProduct>>,
    rejected_ids: Mutex<HashSet<String>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future upsert of `external_id` fail.
    pub fn reject_writes_for(&self, external_id: impl Into<String>) {
        lock(&self.rejected_ids).insert(external_id.into());
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<CachedProduct> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn upsert(&self, product: &CachedProduct) -> Result<UpsertOutcome, StoreError> {
        if lock(&self.rejected_ids).contains(&product.external_id) {
            return Err(StoreError::Rejected {
                external_id: product.external_id.clone(),
                reason: "write rejected by store".to_string(),
            });
        }

        let mut rows = lock(&self.rows);
        if let Some(existing) = rows
            .iter_mut()
            .find(|row| row.external_id == product.external_id)
        {
            *existing = product.clone();
            return Ok(UpsertOutcome::Updated);
        }
        rows.push(product.clone());
        Ok(UpsertOutcome::Inserted)
    }

    async fn get(&self, external_id: &str) -> Result<Option<CachedProduct>, StoreError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.external_id == external_id)
            .cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.rows).len() as u64)
    }

    async fn list_batch(&self, offset: u64, limit: u64) -> Result<Vec<CachedProduct>, StoreError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(lock(&self.rows)
            .iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    omit_fields: Mutex<OmitFields>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new(initial: OmitFields) -> Self {
        Self {
            omit_fields: Mutex::new(initial),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_omit_fields(&self) -> Result<OmitFields, StoreError> {
        Ok(*lock(&self.omit_fields))
    }

    async fn save_omit_fields(&self, fields: OmitFields) -> Result<(), StoreError> {
        *lock(&self.omit_fields) = fields;
        Ok(())
    }
}
