//! Monitoring aggregates over learner progress.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressStatus;
use crate::types::{CourseId, PolicyId, UserId};

/// Per-course counts as read from the store.
///
/// `learners_with_progress` counts distinct eligible learners holding any
/// progress row for the course, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCounts {
    pub policy_id: PolicyId,
    pub policy_title: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub total_questions: u32,
    pub completed_users: u32,
    pub in_progress_users: u32,
    pub learners_with_progress: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroCourseSummary {
    pub course_id: CourseId,
    pub course_title: String,
    pub total_questions: u32,
    pub completed_users: u32,
    pub in_progress_users: u32,
    pub not_started_users: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyProgressSummary {
    pub policy_id: PolicyId,
    pub policy_title: String,
    pub total_micro_courses: u32,
    pub total_questions_policy: u32,
    pub total_completed_users: u32,
    pub total_in_progress_users: u32,
    pub total_not_started_users: u32,
    pub micro_courses: Vec<MicroCourseSummary>,
}

/// One eligible learner's standing on a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProgress {
    pub user_id: UserId,
    pub user_name: String,
    pub progress_status: Option<ProgressStatus>,
    pub completed_date: Option<DateTime<Utc>>,
}

/// Group course counts by policy, keeping the store's ordering.
///
/// Learners without any progress row for a course are not started on it.
#[must_use]
pub fn summarize_policies(
    rows: Vec<CourseCounts>,
    eligible_learners: u32,
) -> Vec<PolicyProgressSummary> {
    let mut index: HashMap<PolicyId, usize> = HashMap::new();
    let mut summaries: Vec<PolicyProgressSummary> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.policy_id).or_insert_with(|| {
            summaries.push(PolicyProgressSummary {
                policy_id: row.policy_id,
                policy_title: row.policy_title.clone(),
                total_micro_courses: 0,
                total_questions_policy: 0,
                total_completed_users: 0,
                total_in_progress_users: 0,
                total_not_started_users: 0,
                micro_courses: Vec::new(),
            });
            summaries.len() - 1
        });

        let not_started_users = eligible_learners.saturating_sub(row.learners_with_progress);
        let summary = &mut summaries[slot];
        summary.total_micro_courses += 1;
        summary.total_questions_policy += row.total_questions;
        summary.total_completed_users += row.completed_users;
        summary.total_in_progress_users += row.in_progress_users;
        summary.total_not_started_users += not_started_users;
        summary.micro_courses.push(MicroCourseSummary {
            course_id: row.course_id,
            course_title: row.course_title,
            total_questions: row.total_questions,
            completed_users: row.completed_users,
            in_progress_users: row.in_progress_users,
            not_started_users,
        });
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(
        policy: i64,
        course: i64,
        completed: u32,
        in_progress: u32,
        with_rows: u32,
    ) -> CourseCounts {
        CourseCounts {
            policy_id: PolicyId(policy),
            policy_title: format!("Policy {policy}"),
            course_id: CourseId(course),
            course_title: format!("Course {course}"),
            total_questions: 3,
            completed_users: completed,
            in_progress_users: in_progress,
            learners_with_progress: with_rows,
        }
    }

    #[test]
    fn not_started_subtracts_any_progress_row() {
        // One learner completed, one in progress, one only has a pre-created
        // NotStarted row: all three have rows, so 10 - 3 remain untouched.
        let summaries = summarize_policies(vec![counts(1, 1, 1, 1, 3)], 10);

        let course = &summaries[0].micro_courses[0];
        assert_eq!(course.completed_users, 1);
        assert_eq!(course.in_progress_users, 1);
        assert_eq!(course.not_started_users, 7);
    }

    #[test]
    fn courses_group_under_their_policy() {
        let summaries = summarize_policies(
            vec![counts(1, 1, 2, 0, 2), counts(1, 2, 0, 1, 1), counts(2, 3, 0, 0, 0)],
            4,
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].total_micro_courses, 2);
        assert_eq!(summaries[0].total_questions_policy, 6);
        assert_eq!(summaries[0].total_completed_users, 2);
        assert_eq!(summaries[0].total_in_progress_users, 1);
        assert_eq!(summaries[0].total_not_started_users, 2 + 3);
        assert_eq!(summaries[1].micro_courses[0].not_started_users, 4);
    }

    #[test]
    fn not_started_never_underflows() {
        let summaries = summarize_policies(vec![counts(1, 1, 5, 0, 5)], 2);
        assert_eq!(summaries[0].micro_courses[0].not_started_users, 0);
    }
}
