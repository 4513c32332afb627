pub mod app_config;
pub mod config;
pub mod de;
pub mod memory;
pub mod omit;
pub mod products;
pub mod reports;
pub mod severity;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, CommerceCredentials, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use memory::{MemoryCacheStore, MemorySettingsStore};
pub use omit::{OmitField, OmitFields, UnknownOmitField};
pub use products::{CachedProduct, Family, SourceImage, SourceVariant};
pub use reports::{BatchReport, FetchSummary, ReconcileAction, RecordOutcome, UpsertOutcome};
pub use severity::Severity;
pub use store::{CacheStore, SettingsStore, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
