use super::types::{
    ComplianceConfig, DEFAULT_HOST, DEFAULT_PORT, DatabaseConfig, RawComplianceConfig,
    RawDatabaseConfig, RawServerConfig, RawTrainingConfig, ServerConfig, TrainingConfig,
    default_database_path,
};
use anyhow::{Context, Result};
use compliance_training::DEFAULT_LEARNER_ROLE;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<ComplianceConfig> {
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Merge the user layer under the project layer and apply defaults
    pub fn load_layers(user: Option<&Path>, project: &Path) -> Result<ComplianceConfig> {
        let mut raw = RawComplianceConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user
            && let Some(user_config) = Self::read_raw(user_path)?
        {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project)? {
            raw = Self::merge_raw(raw, project_config);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("compliance").join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with COMPLIANCE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("COMPLIANCE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".compliance/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawComplianceConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawComplianceConfig, overlay: RawComplianceConfig) -> RawComplianceConfig {
        RawComplianceConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            database: RawDatabaseConfig {
                path: overlay.database.path.or(base.database.path),
                url: overlay.database.url.or(base.database.url),
                auth_token: overlay.database.auth_token.or(base.database.auth_token),
            },
            training: RawTrainingConfig {
                learner_role: overlay.training.learner_role.or(base.training.learner_role),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawComplianceConfig) -> ComplianceConfig {
        ComplianceConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            database: DatabaseConfig {
                path: raw.database.path.unwrap_or_else(default_database_path),
                url: raw.database.url,
                auth_token: raw.database.auth_token,
            },
            training: TrainingConfig {
                learner_role: raw
                    .training
                    .learner_role
                    .unwrap_or_else(|| DEFAULT_LEARNER_ROLE.to_string()),
            },
        }
    }
}
