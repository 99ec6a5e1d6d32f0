//! Serve command for running the training HTTP server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use compliance_server::{ServerConfig, TrainingServer};
use compliance_training::{TrainingEngine, TursoTrainingStore};
use tracing::info;

use crate::config::{ComplianceConfig, ConfigLoader};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Local database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Role counted as a learner in monitoring summaries
    #[arg(long)]
    pub learner_role: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(ConfigLoader::load()?, args);

    let store = open_store(&config).await?;
    let engine =
        TrainingEngine::new(Arc::new(store)).with_learner_role(config.training.learner_role);

    info!(
        "Starting compliance server on {}:{}",
        config.server.host, config.server.port
    );
    let server_config = ServerConfig::new(config.server.host, config.server.port);
    TrainingServer::new(server_config, engine).run().await?;

    Ok(())
}

/// CLI flags take precedence over every config layer
fn apply_overrides(mut config: ComplianceConfig, args: ServeArgs) -> ComplianceConfig {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.database {
        config.database.path = path;
        config.database.url = None;
    }
    if let Some(role) = args.learner_role {
        config.training.learner_role = role;
    }
    config
}

async fn open_store(config: &ComplianceConfig) -> Result<TursoTrainingStore> {
    let database = &config.database;

    if let Some(url) = &database.url {
        info!(%url, "Opening remote training database");
        let token = database.auth_token.as_deref().unwrap_or_default();
        return TursoTrainingStore::new_remote(url, token)
            .await
            .with_context(|| format!("failed to open remote database {url}"));
    }

    if let Some(parent) = database.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    info!(path = %database.path.display(), "Opening training database");
    TursoTrainingStore::new_local(&database.path)
        .await
        .with_context(|| format!("failed to open database {}", database.path.display()))
}
