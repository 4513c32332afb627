use crate::app_config::{AppConfig, CommerceCredentials, Environment};
use crate::{ConfigError, Severity};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        match parse_u32(var, default)? {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            n => Ok(n),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CATSYNC_ENV", "development"))?;

    let bind_addr = parse_addr("CATSYNC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CATSYNC_LOG_LEVEL", "info");
    let log_path = PathBuf::from(or_default("CATSYNC_LOG_PATH", "./logs/catsync-error.log"));
    let log_min_severity = or_default("CATSYNC_LOG_MIN_SEVERITY", "INFO")
        .parse::<Severity>()
        .map_err(|e| invalid("CATSYNC_LOG_MIN_SEVERITY", e.to_string()))?;
    let log_retention_days = parse_u32("CATSYNC_LOG_RETENTION_DAYS", "30")?;

    let db_max_connections = parse_u32("CATSYNC_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CATSYNC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CATSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let source_api_url = or_default(
        "CATSYNC_SOURCE_API_URL",
        "https://api.zecat.cl/generic_product",
    );
    let source_page_size = parse_positive_u32("CATSYNC_SOURCE_PAGE_SIZE", "50")?;
    let source_timeout_secs = parse_u64("CATSYNC_SOURCE_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("CATSYNC_USER_AGENT", "catsync/0.1 (catalog-sync)");

    let import_batch_size = parse_positive_u32("CATSYNC_IMPORT_BATCH_SIZE", "10")?;
    let image_timeout_secs = parse_u64("CATSYNC_IMAGE_TIMEOUT_SECS", "30")?;

    let commerce = match lookup("CATSYNC_COMMERCE_URL") {
        Ok(base_url) => Some(CommerceCredentials {
            base_url,
            username: require("CATSYNC_COMMERCE_USERNAME")?,
            password: require("CATSYNC_COMMERCE_PASSWORD")?,
        }),
        Err(_) => None,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        log_path,
        log_min_severity,
        log_retention_days,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        source_api_url,
        source_page_size,
        source_timeout_secs,
        user_agent,
        import_batch_size,
        image_timeout_secs,
        commerce,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATSYNC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
