use compliance_training::DEFAULT_LEARNER_ROLE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default host for the compliance server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for the compliance server
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawComplianceConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub database: RawDatabaseConfig,

    #[serde(default)]
    pub training: RawTrainingConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDatabaseConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTrainingConfig {
    pub learner_role: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComplianceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the compliance server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Where training data lives.
///
/// A `url` selects a remote libSQL database and takes precedence over the
/// local `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database file
    pub path: PathBuf,

    /// Remote libSQL URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Auth token for the remote database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            url: None,
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Role whose users count as learners in monitoring summaries
    pub learner_role: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learner_role: DEFAULT_LEARNER_ROLE.to_string(),
        }
    }
}

/// `<data_dir>/compliance/training.db`, or the working directory when the
/// platform has no data dir.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("compliance")
        .join("training.db")
}
