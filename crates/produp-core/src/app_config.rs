use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Similarity threshold used when the caller does not supply one.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

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

/// How candidates are partitioned into duplicate groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// Each unprocessed candidate seeds a group and attaches every later
    /// candidate that is similar to the seed. Members need not be similar
    /// to each other.
    #[default]
    SeedAttach,
    /// Groups are connected components of the above-threshold similarity
    /// graph, so similarity is followed transitively.
    Connected,
}

impl std::fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterMode::SeedAttach => write!(f, "seed"),
            ClusterMode::Connected => write!(f, "connected"),
        }
    }
}

impl FromStr for ClusterMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seed" | "seed_attach" => Ok(ClusterMode::SeedAttach),
            "connected" => Ok(ClusterMode::Connected),
            other => Err(CoreError::UnknownClusterMode(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Default similarity threshold, in `(0, 1]`.
    pub detect_threshold: f64,
    pub cluster_mode: ClusterMode,
    /// Fan pairwise scoring out over the rayon pool.
    pub parallel_scoring: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("detect_threshold", &self.detect_threshold)
            .field("cluster_mode", &self.cluster_mode)
            .field("parallel_scoring", &self.parallel_scoring)
            .finish()
    }
}
