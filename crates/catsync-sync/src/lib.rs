//! Catalog synchronization pipelines.
//!
//! - [`fetch`]: walk the source listing and mirror it into the cache.
//! - [`import`]: reconcile cached records into the commerce catalog one
//!   batch at a time.
//! - [`refresh`]: re-fetch and reconcile a single record.
//! - [`log_sink`]: the operator-facing error log every pipeline writes to.
//!
//! All pipelines take an explicitly constructed [`SyncContext`].

pub mod context;
pub mod error;
pub mod fetch;
pub mod import;
pub mod log_sink;
pub mod reconcile;
pub mod refresh;

pub use context::{Commerce, SyncContext};
pub use error::{ReconcileError, SyncError};
pub use fetch::fetch_all_products;
pub use import::{import_all, import_batch, ImportTotals};
pub use log_sink::{LogEntry, LogSink, PruneReport};
pub use reconcile::{reconcile_record, COLOR_ATTRIBUTES};
pub use refresh::refresh_product;
