//! Per-user progression state and the pure rules that drive it.
//!
//! The store persists rows; everything here decides what those rows mean:
//! when a submission completes a course, how `completed_date` evolves, and
//! which courses of a curriculum are locked for a learner.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};
use crate::types::{CourseId, OptionId, PolicyId, QuestionId, UserId};

/// Completion state of one course for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    #[serde(rename = "No iniciado")]
    NotStarted,
    #[serde(rename = "En curso")]
    InProgress,
    #[serde(rename = "Completado")]
    Completed,
}

impl ProgressStatus {
    /// Convert to database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "No iniciado",
            Self::InProgress => "En curso",
            Self::Completed => "Completado",
        }
    }

    /// Parse from database string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "No iniciado" => Some(Self::NotStarted),
            "En curso" => Some(Self::InProgress),
            "Completado" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// What a learner can do with a course in a curriculum listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    #[serde(rename = "Hecho")]
    Done,
    #[serde(rename = "En curso")]
    InProgress,
    #[serde(rename = "No iniciado")]
    NotStarted,
    #[serde(rename = "Bloqueado")]
    Locked,
}

/// A learner's standing on a whole policy curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[serde(rename = "No iniciado")]
    NotStarted,
    #[serde(rename = "En curso")]
    InProgress,
    #[serde(rename = "Finalizado")]
    Finished,
}

/// Persisted progress row for `(user, course)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: ProgressStatus,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub attempts: u32,
    pub last_attempt_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
}

/// One `(question, selected option)` pair of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_option_id: OptionId,
}

/// Outcome of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub status: ProgressStatus,
}

/// Reject malformed submissions before touching the store.
pub fn validate_answers(answers: &[SubmittedAnswer]) -> Result<()> {
    if answers.is_empty() {
        return Err(TrainingError::Validation("no answers provided".into()));
    }

    let mut seen = HashSet::with_capacity(answers.len());
    for answer in answers {
        if answer.question_id.0 <= 0 || answer.selected_option_id.0 <= 0 {
            return Err(TrainingError::Validation(format!(
                "malformed answer for question {} (option {})",
                answer.question_id, answer.selected_option_id
            )));
        }
        if !seen.insert(answer.question_id) {
            return Err(TrainingError::Validation(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }
    }

    Ok(())
}

/// A course is completed iff every question of its bank is answered
/// correctly and the bank is not empty.
#[must_use]
pub fn derive_status(total_questions: u32, correct_answers: u32) -> ProgressStatus {
    if total_questions > 0 && correct_answers == total_questions {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    }
}

/// `completed_date` after a submission that yields `status`.
///
/// Entering `Completed` stamps `now`; staying `Completed` keeps the stamp of
/// the transition; a non-completing submission never clears a stamp.
#[must_use]
pub fn next_completed_date(
    previous: Option<&Progress>,
    status: ProgressStatus,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let previous_date = previous.and_then(|p| p.completed_date);
    let was_completed = previous.is_some_and(|p| p.status == ProgressStatus::Completed);

    match status {
        ProgressStatus::Completed if was_completed => previous_date.or(Some(now)),
        ProgressStatus::Completed => Some(now),
        _ => previous_date,
    }
}

/// Course of a policy curriculum joined with the learner's status, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumRow {
    pub course_id: CourseId,
    pub course_title: String,
    pub order_in_policy: i64,
    pub status: Option<ProgressStatus>,
}

/// Curriculum entry annotated with lock state for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgressView {
    pub course_id: CourseId,
    pub course_title: String,
    pub order_in_policy: i64,
    pub user_progress_status: Option<ProgressStatus>,
    pub action_status: ActionStatus,
    pub is_locked: bool,
}

/// Derive lock state over a curriculum in ordering-key order.
///
/// The first course is always open. A later course opens only while every
/// course before it is `Completed`; a missing progress row counts as
/// `NotStarted`.
#[must_use]
pub fn annotate_curriculum(mut rows: Vec<CurriculumRow>) -> Vec<CourseProgressView> {
    rows.sort_by_key(|row| row.order_in_policy);

    let mut open = true;
    rows.into_iter()
        .map(|row| {
            let is_locked = !open;
            let action_status = if is_locked {
                ActionStatus::Locked
            } else {
                match row.status {
                    Some(ProgressStatus::Completed) => ActionStatus::Done,
                    Some(ProgressStatus::InProgress) => ActionStatus::InProgress,
                    Some(ProgressStatus::NotStarted) | None => ActionStatus::NotStarted,
                }
            };
            open = open && row.status == Some(ProgressStatus::Completed);

            CourseProgressView {
                course_id: row.course_id,
                course_title: row.course_title,
                order_in_policy: row.order_in_policy,
                user_progress_status: row.status,
                action_status,
                is_locked,
            }
        })
        .collect()
}

/// Course of some policy joined with one learner's status, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCourseRow {
    pub policy_id: PolicyId,
    pub policy_title: String,
    pub status: Option<ProgressStatus>,
}

/// A learner's rollup over one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCourseStatus {
    pub policy_id: PolicyId,
    pub policy_title: String,
    pub total_courses: u32,
    pub user_completed_courses: u32,
    pub status: PolicyStatus,
}

/// Group per-course rows into per-policy rollups, keeping first-seen order.
#[must_use]
pub fn rollup_policies(rows: Vec<PolicyCourseRow>) -> Vec<PolicyCourseStatus> {
    let mut index: HashMap<PolicyId, usize> = HashMap::new();
    let mut rollups: Vec<(PolicyCourseStatus, bool)> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.policy_id).or_insert_with(|| {
            rollups.push((
                PolicyCourseStatus {
                    policy_id: row.policy_id,
                    policy_title: row.policy_title.clone(),
                    total_courses: 0,
                    user_completed_courses: 0,
                    status: PolicyStatus::NotStarted,
                },
                false,
            ));
            rollups.len() - 1
        });

        let (rollup, any_in_progress) = &mut rollups[slot];
        rollup.total_courses += 1;
        match row.status {
            Some(ProgressStatus::Completed) => rollup.user_completed_courses += 1,
            Some(ProgressStatus::InProgress) => *any_in_progress = true,
            _ => {}
        }
    }

    rollups
        .into_iter()
        .map(|(mut rollup, any_in_progress)| {
            rollup.status = if rollup.total_courses > 0
                && rollup.user_completed_courses == rollup.total_courses
            {
                PolicyStatus::Finished
            } else if any_in_progress || rollup.user_completed_courses > 0 {
                PolicyStatus::InProgress
            } else {
                PolicyStatus::NotStarted
            };
            rollup
        })
        .collect()
}
