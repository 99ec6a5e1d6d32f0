//! Shared application state for the compliance server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use compliance_training::TrainingEngine;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Progression engine backing every training route
    pub engine: Arc<TrainingEngine>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around a configured engine
    pub fn new(engine: TrainingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
