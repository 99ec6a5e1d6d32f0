//! The training progression engine.
//!
//! [`TrainingEngine`] is the surface consumed by the HTTP layer. It validates
//! input before any store interaction, resolves referenced rows into
//! `NotFound` errors, and chains course completion into unlocking the next
//! course of the policy curriculum.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::course::{Course, CourseDetailsForUser, CourseWithQuestions, NewCourse, Question};
use crate::directory::{DEFAULT_LEARNER_ROLE, NewPolicy, NewUser, Policy, User};
use crate::error::{Result, TrainingError};
use crate::progress::{
    CourseProgressView, PolicyCourseStatus, ProgressStatus, SubmissionResult, SubmittedAnswer,
    annotate_curriculum, rollup_policies, validate_answers,
};
use crate::storage::TrainingStore;
use crate::summary::{LearnerProgress, PolicyProgressSummary, summarize_policies};
use crate::types::{CourseId, PolicyId, UserId};

/// Coordinates quiz scoring, completion and curriculum unlocking.
#[derive(Clone)]
pub struct TrainingEngine {
    store: Arc<dyn TrainingStore>,
    learner_role: String,
}

impl TrainingEngine {
    /// Create an engine counting users with the default learner role.
    pub fn new(store: Arc<dyn TrainingStore>) -> Self {
        Self {
            store,
            learner_role: DEFAULT_LEARNER_ROLE.to_string(),
        }
    }

    /// Use a different role to select eligible learners.
    #[must_use]
    pub fn with_learner_role(mut self, role: impl Into<String>) -> Self {
        self.learner_role = role.into();
        self
    }

    /// Role whose users count as eligible learners.
    pub fn learner_role(&self) -> &str {
        &self.learner_role
    }

    async fn require_user(&self, id: UserId) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| TrainingError::NotFound(format!("user {}", id)))
    }

    async fn require_policy(&self, id: PolicyId) -> Result<Policy> {
        self.store
            .get_policy(id)
            .await?
            .ok_or_else(|| TrainingError::NotFound(format!("policy {}", id)))
    }

    async fn require_course(&self, id: CourseId) -> Result<Course> {
        self.store
            .get_course(id)
            .await?
            .ok_or_else(|| TrainingError::NotFound(format!("course {}", id)))
    }

    // === Authoring ===

    /// Register a directory user.
    pub async fn register_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        Ok(self.store.insert_user(user, Utc::now()).await?)
    }

    /// Create a policy that can own a curriculum.
    pub async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy> {
        policy.validate()?;
        Ok(self.store.insert_policy(policy, Utc::now()).await?)
    }

    /// Create a course with its quiz in one transaction.
    #[instrument(skip(self, course), fields(title = %course.title), level = "debug")]
    pub async fn create_course(&self, course: &NewCourse) -> Result<Course> {
        course.validate()?;
        if let Some(policy) = course.policy_id {
            self.require_policy(policy).await?;
        }

        let created = self.store.insert_course(course, Utc::now()).await?;
        info!(
            course = %created.id,
            questions = course.questions.len(),
            "course created"
        );
        Ok(created)
    }

    /// List all courses, newest first.
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.store.list_courses().await?)
    }

    /// Course with its full question bank, correctness included.
    pub async fn course_with_questions(&self, course: CourseId) -> Result<CourseWithQuestions> {
        let course = self.require_course(course).await?;
        let questions = self.store.questions_by_course(course.id).await?;
        Ok(CourseWithQuestions { course, questions })
    }

    /// Questions of a course with their options.
    pub async fn questions_by_course(&self, course: CourseId) -> Result<Vec<Question>> {
        self.require_course(course).await?;
        Ok(self.store.questions_by_course(course).await?)
    }

    // === Learner operations ===

    /// Course, quiz without answer keys, and the learner's progress.
    pub async fn course_details_for_user(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<CourseDetailsForUser> {
        let course = self.require_course(course).await?;
        self.require_user(user).await?;

        let questions = self.store.questions_by_course(course.id).await?;
        let user_progress = self.store.get_progress(user, course.id).await?;

        Ok(CourseDetailsForUser {
            course,
            questions: questions.into_iter().map(Into::into).collect(),
            user_progress,
        })
    }

    /// Score a quiz submission and record it atomically.
    ///
    /// On completion of a policy course the next course of the curriculum is
    /// unlocked. Lock state is re-derived at read time, so a failed unlock is
    /// logged rather than failing the committed submission.
    #[instrument(skip(self, answers), fields(answers = answers.len()), level = "debug")]
    pub async fn submit_answers(
        &self,
        user: UserId,
        course: CourseId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult> {
        validate_answers(answers)?;
        let course = self.require_course(course).await?;
        self.require_user(user).await?;

        let result = self
            .store
            .record_submission(user, course.id, answers, Utc::now())
            .await?;

        if result.status != ProgressStatus::Completed {
            return Ok(result);
        }
        info!(%user, course = %course.id, "course completed");

        if let Some(policy) = course.policy_id
            && let Err(err) = self
                .store
                .unlock_next_course(user, policy, course.order_in_policy)
                .await
        {
            warn!(%user, %policy, error = %err, "failed to unlock next course");
        }

        Ok(result)
    }

    /// Make the course after `completed_order` available to `user`.
    ///
    /// Idempotent: an existing progress row on the next course is never
    /// touched. Returns `false` when `completed_order` ends the curriculum.
    #[instrument(skip(self), level = "debug")]
    pub async fn enable_next_course(
        &self,
        user: UserId,
        policy: PolicyId,
        completed_order: i64,
    ) -> Result<bool> {
        self.require_user(user).await?;
        self.require_policy(policy).await?;

        let next = self
            .store
            .unlock_next_course(user, policy, completed_order)
            .await?;
        Ok(next.is_some())
    }

    /// Curriculum of a policy annotated with lock state for `user`.
    pub async fn courses_by_policy_for_user(
        &self,
        policy: PolicyId,
        user: UserId,
    ) -> Result<Vec<CourseProgressView>> {
        self.require_policy(policy).await?;
        self.require_user(user).await?;

        let rows = self.store.curriculum_for_user(policy, user).await?;
        Ok(annotate_curriculum(rows))
    }

    /// Per-policy rollup of `user`'s progress.
    pub async fn policies_with_course_status(
        &self,
        user: UserId,
    ) -> Result<Vec<PolicyCourseStatus>> {
        self.require_user(user).await?;
        let rows = self.store.policy_courses_for_user(user).await?;
        Ok(rollup_policies(rows))
    }

    // === Monitoring ===

    /// Learner status buckets for every policy course.
    pub async fn policy_progress_summary(&self) -> Result<Vec<PolicyProgressSummary>> {
        let learners = self.store.count_learners(&self.learner_role).await?;
        let counts = self.store.course_counts(&self.learner_role).await?;
        Ok(summarize_policies(counts, learners))
    }

    /// Every eligible learner's status on one course.
    pub async fn course_progress_detail(&self, course: CourseId) -> Result<Vec<LearnerProgress>> {
        self.require_course(course).await?;
        Ok(self
            .store
            .course_progress_detail(course, &self.learner_role)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{NewOption, NewQuestion};
    use crate::storage::TursoTrainingStore;
    use tempfile::TempDir;

    async fn create_test_engine() -> (TrainingEngine, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = TursoTrainingStore::new_local(&dir.path().join("training.db"))
            .await
            .unwrap();
        (TrainingEngine::new(Arc::new(store)), dir)
    }

    fn one_question_course(policy: Option<PolicyId>, order: i64) -> NewCourse {
        NewCourse {
            policy_id: policy,
            title: format!("Course {order}"),
            description: "Quiz".into(),
            material_type: "video".into(),
            material_link: None,
            order_in_policy: order,
            questions: vec![NewQuestion {
                question_text: "Report phishing?".into(),
                options: vec![
                    NewOption {
                        option_text: "Yes".into(),
                        is_correct: true,
                    },
                    NewOption {
                        option_text: "No".into(),
                        is_correct: false,
                    },
                ],
            }],
        }
    }

    async fn learner(engine: &TrainingEngine) -> User {
        engine
            .register_user(&NewUser {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                role: DEFAULT_LEARNER_ROLE.into(),
                position: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_submission_is_validation_error() {
        let (engine, _dir) = create_test_engine().await;

        let err = engine
            .submit_answers(UserId(1), CourseId(1), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrainingError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (engine, _dir) = create_test_engine().await;
        let user = learner(&engine).await;

        let err = engine
            .submit_answers(
                user.id,
                CourseId(404),
                &[SubmittedAnswer {
                    question_id: crate::types::QuestionId(1),
                    selected_option_id: crate::types::OptionId(1),
                }],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TrainingError::NotFound(_)));
    }

    #[tokio::test]
    async fn course_for_unknown_policy_is_not_found() {
        let (engine, _dir) = create_test_engine().await;

        let err = engine
            .create_course(&one_question_course(Some(PolicyId(9)), 1))
            .await
            .unwrap_err();

        assert!(matches!(err, TrainingError::NotFound(_)));
    }

    #[tokio::test]
    async fn completing_unlinked_course_unlocks_nothing() {
        let (engine, _dir) = create_test_engine().await;
        let user = learner(&engine).await;
        let course = engine
            .create_course(&one_question_course(None, 1))
            .await
            .unwrap();
        let policy = engine
            .create_policy(&NewPolicy {
                title: "Security".into(),
                description: None,
            })
            .await
            .unwrap();
        let policy_course = engine
            .create_course(&one_question_course(Some(policy.id), 2))
            .await
            .unwrap();
        let questions = engine.questions_by_course(course.id).await.unwrap();

        let result = engine
            .submit_answers(
                user.id,
                course.id,
                &[SubmittedAnswer {
                    question_id: questions[0].id,
                    selected_option_id: questions[0].options[0].id,
                }],
            )
            .await
            .unwrap();

        assert_eq!(result.status, ProgressStatus::Completed);
        assert_eq!(result.total_questions, 1);
        assert!(
            engine
                .store
                .get_progress(user.id, policy_course.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn completing_course_at_largest_position_succeeds() {
        let (engine, _dir) = create_test_engine().await;
        let user = learner(&engine).await;
        let policy = engine
            .create_policy(&NewPolicy {
                title: "Security".into(),
                description: None,
            })
            .await
            .unwrap();
        let course = engine
            .create_course(&one_question_course(Some(policy.id), i64::MAX))
            .await
            .unwrap();
        let questions = engine.questions_by_course(course.id).await.unwrap();

        let result = engine
            .submit_answers(
                user.id,
                course.id,
                &[SubmittedAnswer {
                    question_id: questions[0].id,
                    selected_option_id: questions[0].options[0].id,
                }],
            )
            .await
            .unwrap();

        assert_eq!(result.status, ProgressStatus::Completed);
        assert!(
            !engine
                .enable_next_course(user.id, policy.id, i64::MAX)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn learner_view_hides_answer_keys() {
        let (engine, _dir) = create_test_engine().await;
        let user = learner(&engine).await;
        let course = engine
            .create_course(&one_question_course(None, 1))
            .await
            .unwrap();

        let details = engine
            .course_details_for_user(course.id, user.id)
            .await
            .unwrap();

        assert_eq!(details.questions.len(), 1);
        assert_eq!(details.questions[0].options.len(), 2);
        assert!(details.user_progress.is_none());
    }

    #[tokio::test]
    async fn engine_uses_configured_learner_role() {
        let (engine, _dir) = create_test_engine().await;
        let engine = engine.with_learner_role("Auditor");
        assert_eq!(engine.learner_role(), "Auditor");
    }
}
