//! HTTP server module

mod api;
mod error;
mod training;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use api::HealthResponse;
pub use error::{ApiError, ErrorResponse};
pub use training::SubmitAnswersRequest;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/users", post(api::create_user))
        .route("/api/policies", post(api::create_policy))
        .nest("/api/training", training_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn training_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/courses",
            get(training::list_courses).post(training::create_course),
        )
        .route("/courses/:id", get(training::get_course))
        .route("/monitor/summary", get(training::monitor_summary))
        .route(
            "/monitor/course/:course_id/detail",
            get(training::monitor_course_detail),
        )
        .route(
            "/employee/:user_id/policies",
            get(training::employee_policies),
        )
        .route(
            "/employee/:user_id/policy/:policy_id/courses",
            get(training::employee_policy_courses),
        )
        .route(
            "/employee/:user_id/course/:course_id",
            get(training::employee_course),
        )
        .route(
            "/employee/:user_id/course/:course_id/submit-answers",
            post(training::submit_answers),
        )
}
