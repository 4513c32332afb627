use std::net::SocketAddr;
use std::path::PathBuf;

use crate::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Base URL and basic-auth credentials for the commerce site's REST API.
#[derive(Clone)]
pub struct CommerceCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CommerceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Operator-facing error log file.
    pub log_path: PathBuf,
    /// Entries below this severity are not written to `log_path`.
    pub log_min_severity: Severity,
    pub log_retention_days: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub source_api_url: String,
    pub source_page_size: u32,
    pub source_timeout_secs: u64,
    pub user_agent: String,
    pub import_batch_size: u32,
    pub image_timeout_secs: u64,
    /// `None` when the commerce variables are not set. Commands that only
    /// touch the cache (fetch, migrate, log) run without them.
    pub commerce: Option<CommerceCredentials>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_path", &self.log_path)
            .field("log_min_severity", &self.log_min_severity)
            .field("log_retention_days", &self.log_retention_days)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("source_api_url", &self.source_api_url)
            .field("source_page_size", &self.source_page_size)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("import_batch_size", &self.import_batch_size)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("commerce", &self.commerce)
            .finish()
    }
}
