pub mod app_config;
pub mod catalog;
pub mod config;

pub use app_config::{AppConfig, ClusterMode, Environment, DEFAULT_THRESHOLD};
pub use catalog::{CatalogRecord, ProductSnapshot, RecordKey, Source, UserId};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
    #[error("unknown catalog source: {0}")]
    UnknownSource(String),
    #[error("unknown cluster mode: {0}")]
    UnknownClusterMode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
