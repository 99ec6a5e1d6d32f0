//! Service and directory handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use compliance_training::{NewPolicy, NewUser, Policy, User};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Role counted as a learner in monitoring views
    pub learner_role: String,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        learner_role: state.engine.learner_role().to_string(),
    })
}

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(user) = body?;
    let user = state.engine.register_user(&user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/policies
pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewPolicy>, JsonRejection>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let Json(policy) = body?;
    let policy = state.engine.create_policy(&policy).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}
