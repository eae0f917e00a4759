use crate::app_config::{AppConfig, ClusterMode, Environment, DEFAULT_THRESHOLD};
use crate::ConfigError;

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
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PRODUP_ENV", "development"))?;
    let log_level = or_default("PRODUP_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PRODUP_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("PRODUP_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRODUP_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let detect_threshold = parse_threshold(&or_default(
        "PRODUP_DETECT_THRESHOLD",
        &DEFAULT_THRESHOLD.to_string(),
    ))
    .map_err(|reason| invalid("PRODUP_DETECT_THRESHOLD", reason))?;

    let cluster_mode = or_default("PRODUP_CLUSTER_MODE", "seed")
        .parse::<ClusterMode>()
        .map_err(|e| invalid("PRODUP_CLUSTER_MODE", e.to_string()))?;

    let parallel_scoring = parse_bool(&or_default("PRODUP_PARALLEL_SCORING", "false"))
        .map_err(|reason| invalid("PRODUP_PARALLEL_SCORING", reason))?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        detect_threshold,
        cluster_mode,
        parallel_scoring,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRODUP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a similarity threshold, which must lie in `(0, 1]`.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value = s.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("threshold {value} is outside (0, 1]"))
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
