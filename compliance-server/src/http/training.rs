//! Training routes: authoring, learner progression and monitoring

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use compliance_training::{
    Course, CourseDetailsForUser, CourseId, CourseProgressView, CourseWithQuestions,
    LearnerProgress, NewCourse, PolicyCourseStatus, PolicyId, PolicyProgressSummary,
    SubmissionResult, SubmittedAnswer, UserId,
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

/// Body of a quiz submission
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<SubmittedAnswer>,
}

// ============================================================================
// Authoring
// ============================================================================

/// POST /api/training/courses
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let Json(course) = body?;
    let course = state.engine.create_course(&course).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/training/courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.engine.list_courses().await?))
}

/// GET /api/training/courses/:id
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course): Path<CourseId>,
) -> Result<Json<CourseWithQuestions>, ApiError> {
    Ok(Json(state.engine.course_with_questions(course).await?))
}

// ============================================================================
// Monitoring
// ============================================================================

/// GET /api/training/monitor/summary
pub async fn monitor_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PolicyProgressSummary>>, ApiError> {
    Ok(Json(state.engine.policy_progress_summary().await?))
}

/// GET /api/training/monitor/course/:course_id/detail
pub async fn monitor_course_detail(
    State(state): State<Arc<AppState>>,
    Path(course): Path<CourseId>,
) -> Result<Json<Vec<LearnerProgress>>, ApiError> {
    Ok(Json(state.engine.course_progress_detail(course).await?))
}

// ============================================================================
// Learner
// ============================================================================

/// GET /api/training/employee/:user_id/policies
pub async fn employee_policies(
    State(state): State<Arc<AppState>>,
    Path(user): Path<UserId>,
) -> Result<Json<Vec<PolicyCourseStatus>>, ApiError> {
    Ok(Json(state.engine.policies_with_course_status(user).await?))
}

/// GET /api/training/employee/:user_id/policy/:policy_id/courses
pub async fn employee_policy_courses(
    State(state): State<Arc<AppState>>,
    Path((user, policy)): Path<(UserId, PolicyId)>,
) -> Result<Json<Vec<CourseProgressView>>, ApiError> {
    Ok(Json(
        state.engine.courses_by_policy_for_user(policy, user).await?,
    ))
}

/// GET /api/training/employee/:user_id/course/:course_id
pub async fn employee_course(
    State(state): State<Arc<AppState>>,
    Path((user, course)): Path<(UserId, CourseId)>,
) -> Result<Json<CourseDetailsForUser>, ApiError> {
    Ok(Json(state.engine.course_details_for_user(course, user).await?))
}

/// POST /api/training/employee/:user_id/course/:course_id/submit-answers
pub async fn submit_answers(
    State(state): State<Arc<AppState>>,
    Path((user, course)): Path<(UserId, CourseId)>,
    body: Result<Json<SubmitAnswersRequest>, JsonRejection>,
) -> Result<Json<SubmissionResult>, ApiError> {
    let Json(request) = body?;
    Ok(Json(
        state
            .engine
            .submit_answers(user, course, &request.answers)
            .await?,
    ))
}
