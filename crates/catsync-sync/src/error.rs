use catsync_commerce::{CommerceError, ImageError};
use catsync_core::StoreError;
use catsync_source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source API error: {0}")]
    Source(#[from] SourceError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("commerce client error: {0}")]
    Commerce(#[from] CommerceError),

    #[error("image client error: {0}")]
    Image(#[from] ImageError),

    #[error("commerce site is not configured (set CATSYNC_COMMERCE_URL)")]
    CommerceNotConfigured,
}

/// Failure reconciling one cached record. Carried into the batch report as
/// the record's failure reason; never aborts a batch.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("commerce site is not configured")]
    NotConfigured,

    #[error("lookup of SKU {sku} failed: {source}")]
    Lookup {
        sku: String,
        #[source]
        source: CommerceError,
    },

    #[error("saving product {sku} failed: {source}")]
    SaveProduct {
        sku: String,
        #[source]
        source: CommerceError,
    },

    #[error("saving variation {sku} failed: {source}")]
    SaveVariation {
        sku: String,
        #[source]
        source: CommerceError,
    },

    #[error("attribute {slug} could not be resolved: {source}")]
    Attribute {
        slug: String,
        #[source]
        source: CommerceError,
    },

    #[error("term '{term}' of attribute {slug} could not be resolved: {source}")]
    Term {
        slug: String,
        term: String,
        #[source]
        source: CommerceError,
    },
}
