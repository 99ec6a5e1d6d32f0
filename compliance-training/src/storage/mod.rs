//! Storage trait and libSQL implementation for training data.
//!
//! The store owns physical persistence and transactional scoping; the
//! progression rules it applies inside a transaction live in
//! [`crate::progress`] so they can be tested without a database.

mod error;
mod migrations;
mod turso;

pub use error::{Error, Result};
pub use turso::TursoTrainingStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::course::{Course, NewCourse, Question};
use crate::directory::{NewPolicy, NewUser, Policy, User};
use crate::progress::{CurriculumRow, PolicyCourseRow, Progress, SubmissionResult, SubmittedAnswer};
use crate::summary::{CourseCounts, LearnerProgress};
use crate::types::{CourseId, PolicyId, UserId};

/// Durable relational store behind the progression engine.
#[async_trait]
pub trait TrainingStore: Send + Sync {
    /// Insert a directory user.
    async fn insert_user(&self, user: &NewUser, now: DateTime<Utc>) -> Result<User>;

    /// Get a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Insert a policy.
    async fn insert_policy(&self, policy: &NewPolicy, now: DateTime<Utc>) -> Result<Policy>;

    /// Get a policy by ID.
    async fn get_policy(&self, id: PolicyId) -> Result<Option<Policy>>;

    /// Insert a course with its questions and options in one transaction.
    async fn insert_course(&self, course: &NewCourse, now: DateTime<Utc>) -> Result<Course>;

    /// Get a course by ID.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// List all courses, newest first.
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Questions of a course with their options, in creation order.
    async fn questions_by_course(&self, course: CourseId) -> Result<Vec<Question>>;

    /// Get the progress row for `(user, course)`.
    async fn get_progress(&self, user: UserId, course: CourseId) -> Result<Option<Progress>>;

    /// Score and persist a submission atomically.
    ///
    /// Upserts every answer, recomputes the counters from the question bank
    /// and upserts the progress row, all inside one transaction.
    async fn record_submission(
        &self,
        user: UserId,
        course: CourseId,
        answers: &[SubmittedAnswer],
        now: DateTime<Utc>,
    ) -> Result<SubmissionResult>;

    /// Insert a `NotStarted` progress row for the course following
    /// `completed_order` in `policy`, unless one already exists.
    ///
    /// Returns the next course, or `None` when the curriculum ends there.
    async fn unlock_next_course(
        &self,
        user: UserId,
        policy: PolicyId,
        completed_order: i64,
    ) -> Result<Option<CourseId>>;

    /// Courses of a policy joined with the user's status, by ordering key.
    async fn curriculum_for_user(
        &self,
        policy: PolicyId,
        user: UserId,
    ) -> Result<Vec<CurriculumRow>>;

    /// Every policy course joined with the user's status.
    async fn policy_courses_for_user(&self, user: UserId) -> Result<Vec<PolicyCourseRow>>;

    /// Per-course question and learner counts for every policy course.
    async fn course_counts(&self, learner_role: &str) -> Result<Vec<CourseCounts>>;

    /// Number of users holding the learner role.
    async fn count_learners(&self, learner_role: &str) -> Result<u32>;

    /// Every learner's status on a course, by name.
    async fn course_progress_detail(
        &self,
        course: CourseId,
        learner_role: &str,
    ) -> Result<Vec<LearnerProgress>>;
}
