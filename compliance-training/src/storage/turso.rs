//! Turso/libSQL implementation of training storage.
//!
//! This module provides persistent storage using Turso (libSQL).
//! It can connect to:
//! - Remote Turso database (cloud)
//! - Local embedded SQLite file

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, TransactionBehavior};
use tracing::{debug, instrument, warn};

use super::migrations::Migrator;
use super::{Error, Result, TrainingStore};
use crate::course::{AnswerOption, Course, NewCourse, Question};
use crate::directory::{NewPolicy, NewUser, Policy, User};
use crate::progress::{
    CurriculumRow, PolicyCourseRow, Progress, ProgressStatus, SubmissionResult, SubmittedAnswer,
    derive_status, next_completed_date,
};
use crate::summary::{CourseCounts, LearnerProgress};
use crate::types::{CourseId, OptionId, PolicyId, QuestionId, UserId};

/// How long a local connection waits on a locked database file.
const BUSY_TIMEOUT_MS: u32 = 5_000;

const COURSE_COLUMNS: &str = "tc.id, tc.policy_id, p.title, tc.title, tc.description, tc.material_type, tc.material_link, tc.order_in_policy, tc.created_at";

const PROGRESS_COLUMNS: &str = "user_id, course_id, status, total_questions, correct_answers, attempts, last_attempt_date, completed_date";

/// Turso-backed training storage.
#[derive(Clone)]
pub struct TursoTrainingStore {
    db: Arc<Database>,
    local: bool,
}

impl TursoTrainingStore {
    /// Create a new storage instance with a local embedded database.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let store = Self {
            db: Arc::new(db),
            local: true,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create a new storage instance connected to a remote Turso database.
    pub async fn new_remote(url: &str, token: &str) -> Result<Self> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;
        let store = Self {
            db: Arc::new(db),
            local: false,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Get a database connection.
    ///
    /// Local connections are opened with foreign keys enforced and a busy
    /// timeout, since each call opens a fresh SQLite handle.
    async fn conn(&self) -> Result<Connection> {
        let conn = self.db.connect()?;
        if self.local {
            // busy_timeout reports the new value as a row
            conn.query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
                .await?;
            conn.execute("PRAGMA foreign_keys = ON", ()).await?;
        }
        Ok(conn)
    }

    /// Ensure the database schema exists.
    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn().await?;
        Migrator::new(&conn).migrate().await
    }

    /// Begin a write transaction that takes the database lock up front.
    async fn begin(conn: &Connection) -> Result<libsql::Transaction> {
        Ok(conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?)
    }

    /// Commit `tx` when `outcome` succeeded, roll it back otherwise.
    async fn finish<T>(tx: libsql::Transaction, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Parse a course from a row selected with [`COURSE_COLUMNS`].
    fn parse_course(row: &libsql::Row) -> Result<Course> {
        let id: i64 = row.get(0)?;
        let policy_id: Option<i64> = row.get(1)?;
        let policy_title: Option<String> = row.get(2)?;
        let title: String = row.get(3)?;
        let description: String = row.get(4)?;
        let material_type: String = row.get(5)?;
        let material_link: Option<String> = row.get(6)?;
        let order_in_policy: i64 = row.get(7)?;
        let created_at_str: String = row.get(8)?;

        Ok(Course {
            id: CourseId(id),
            policy_id: policy_id.map(PolicyId),
            policy_title,
            title,
            description,
            material_type,
            material_link,
            order_in_policy,
            created_at: parse_datetime(&created_at_str)?,
        })
    }

    /// Parse a progress row selected with [`PROGRESS_COLUMNS`].
    fn parse_progress(row: &libsql::Row) -> Result<Progress> {
        let user_id: i64 = row.get(0)?;
        let course_id: i64 = row.get(1)?;
        let status_str: String = row.get(2)?;
        let total_questions: i64 = row.get(3)?;
        let correct_answers: i64 = row.get(4)?;
        let attempts: i64 = row.get(5)?;
        let last_attempt_str: Option<String> = row.get(6)?;
        let completed_str: Option<String> = row.get(7)?;

        Ok(Progress {
            user_id: UserId(user_id),
            course_id: CourseId(course_id),
            status: parse_status(&status_str)?,
            total_questions: to_count(total_questions, "total_questions")?,
            correct_answers: to_count(correct_answers, "correct_answers")?,
            attempts: to_count(attempts, "attempts")?,
            last_attempt_date: last_attempt_str.as_deref().map(parse_datetime).transpose()?,
            completed_date: completed_str.as_deref().map(parse_datetime).transpose()?,
        })
    }

    async fn fetch_progress(
        conn: &Connection,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Progress>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM user_course_progress WHERE user_id = ? AND course_id = ?"
                ),
                libsql::params![user.0, course.0],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_progress(&row)?)),
            None => Ok(None),
        }
    }

    async fn count(
        conn: &Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<u32> {
        let mut rows = conn.query(sql, params).await?;
        let value: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        to_count(value, "count")
    }

    /// Look up the correctness of each selected option, rejecting answers
    /// whose question is outside the course or whose option is outside
    /// the question.
    async fn judge_answers(
        conn: &Connection,
        course: CourseId,
        answers: &[SubmittedAnswer],
    ) -> Result<Vec<bool>> {
        let mut verdicts = Vec::with_capacity(answers.len());

        for answer in answers {
            let mut rows = conn
                .query(
                    "SELECT 1 FROM questions WHERE id = ? AND course_id = ?",
                    libsql::params![answer.question_id.0, course.0],
                )
                .await?;
            if rows.next().await?.is_none() {
                return Err(Error::Rejected(format!(
                    "question {} is not part of course {}",
                    answer.question_id, course
                )));
            }

            let mut rows = conn
                .query(
                    "SELECT is_correct FROM options WHERE id = ? AND question_id = ?",
                    libsql::params![answer.selected_option_id.0, answer.question_id.0],
                )
                .await?;
            let is_correct: i64 = match rows.next().await? {
                Some(row) => row.get(0)?,
                None => {
                    return Err(Error::Rejected(format!(
                        "option {} does not belong to question {}",
                        answer.selected_option_id, answer.question_id
                    )));
                }
            };
            verdicts.push(is_correct != 0);
        }

        Ok(verdicts)
    }

    async fn apply_submission(
        conn: &Connection,
        user: UserId,
        course: CourseId,
        answers: &[SubmittedAnswer],
        now: DateTime<Utc>,
    ) -> Result<SubmissionResult> {
        let verdicts = Self::judge_answers(conn, course, answers).await?;
        let answered_at = format_datetime(now);

        for (answer, is_correct) in answers.iter().zip(verdicts) {
            conn.execute(
                "INSERT INTO user_answers (user_id, course_id, question_id, selected_option_id, is_correct, answered_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT (user_id, course_id, question_id) DO UPDATE SET
                     selected_option_id = excluded.selected_option_id,
                     is_correct = excluded.is_correct,
                     answered_at = excluded.answered_at",
                libsql::params![
                    user.0,
                    course.0,
                    answer.question_id.0,
                    answer.selected_option_id.0,
                    i64::from(is_correct),
                    answered_at.clone()
                ],
            )
            .await?;
        }

        let total_questions = Self::count(
            conn,
            "SELECT COUNT(*) FROM questions WHERE course_id = ?",
            [course.0],
        )
        .await?;

        // The option's current flag is authoritative; restricting to the
        // course's own questions keeps stray rows out of the score.
        let correct_answers = Self::count(
            conn,
            "SELECT COUNT(*)
             FROM user_answers a
             JOIN questions q ON q.id = a.question_id AND q.course_id = a.course_id
             JOIN options o ON o.id = a.selected_option_id AND o.question_id = a.question_id
             WHERE a.user_id = ? AND a.course_id = ? AND o.is_correct = 1",
            libsql::params![user.0, course.0],
        )
        .await?;

        let status = derive_status(total_questions, correct_answers);
        let previous = Self::fetch_progress(conn, user, course).await?;
        let completed_date = next_completed_date(previous.as_ref(), status, now);

        conn.execute(
            "INSERT INTO user_course_progress
                 (user_id, course_id, status, total_questions, correct_answers, attempts, last_attempt_date, completed_date)
             VALUES (?, ?, ?, ?, ?, 1, ?, ?)
             ON CONFLICT (user_id, course_id) DO UPDATE SET
                 status = excluded.status,
                 total_questions = excluded.total_questions,
                 correct_answers = excluded.correct_answers,
                 attempts = user_course_progress.attempts + 1,
                 last_attempt_date = excluded.last_attempt_date,
                 completed_date = excluded.completed_date",
            libsql::params![
                user.0,
                course.0,
                status.as_str(),
                i64::from(total_questions),
                i64::from(correct_answers),
                answered_at,
                completed_date.map(format_datetime)
            ],
        )
        .await?;

        Ok(SubmissionResult {
            total_questions,
            correct_answers,
            status,
        })
    }

    async fn apply_course(
        conn: &Connection,
        course: &NewCourse,
        now: DateTime<Utc>,
    ) -> Result<CourseId> {
        let created_at = format_datetime(now);

        if let Some(policy_id) = course.policy_id {
            let mut rows = conn
                .query(
                    "SELECT 1 FROM training_courses WHERE policy_id = ? AND order_in_policy = ?",
                    libsql::params![policy_id.0, course.order_in_policy],
                )
                .await?;
            if rows.next().await?.is_some() {
                return Err(Error::Rejected(format!(
                    "policy {} already has a course at position {}",
                    policy_id, course.order_in_policy
                )));
            }
        }

        conn.execute(
            "INSERT INTO training_courses (policy_id, title, description, material_type, material_link, order_in_policy, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                course.policy_id.map(|id| id.0),
                course.title.clone(),
                course.description.clone(),
                course.material_type.clone(),
                course.material_link.clone(),
                course.order_in_policy,
                created_at.clone()
            ],
        )
        .await?;
        let course_id = CourseId(conn.last_insert_rowid());

        for question in &course.questions {
            conn.execute(
                "INSERT INTO questions (course_id, question_text, created_at) VALUES (?, ?, ?)",
                libsql::params![course_id.0, question.question_text.clone(), created_at.clone()],
            )
            .await?;
            let question_id = conn.last_insert_rowid();

            for option in &question.options {
                conn.execute(
                    "INSERT INTO options (question_id, option_text, is_correct) VALUES (?, ?, ?)",
                    libsql::params![
                        question_id,
                        option.option_text.clone(),
                        i64::from(option.is_correct)
                    ],
                )
                .await?;
            }
        }

        Ok(course_id)
    }

    async fn apply_unlock(
        conn: &Connection,
        user: UserId,
        policy: PolicyId,
        completed_order: i64,
    ) -> Result<Option<CourseId>> {
        // Nothing can follow the largest position
        let Some(next_order) = completed_order.checked_add(1) else {
            return Ok(None);
        };

        let mut rows = conn
            .query(
                "SELECT id FROM training_courses WHERE policy_id = ? AND order_in_policy = ?",
                libsql::params![policy.0, next_order],
            )
            .await?;
        let next = match rows.next().await? {
            Some(row) => CourseId(row.get::<i64>(0)?),
            None => return Ok(None),
        };

        let inserted = conn
            .execute(
                "INSERT INTO user_course_progress (user_id, course_id, status, total_questions, correct_answers, attempts)
                 VALUES (?, ?, ?, 0, 0, 0)
                 ON CONFLICT (user_id, course_id) DO NOTHING",
                libsql::params![user.0, next.0, ProgressStatus::NotStarted.as_str()],
            )
            .await?;

        debug!(%user, %policy, next_course = %next, inserted = inserted > 0, "next course unlocked");
        Ok(Some(next))
    }
}

#[async_trait]
impl TrainingStore for TursoTrainingStore {
    #[instrument(skip(self, user), level = "debug")]
    async fn insert_user(&self, user: &NewUser, now: DateTime<Utc>) -> Result<User> {
        let conn = self.conn().await?;

        let inserted = conn
            .execute(
                "INSERT INTO users (name, email, role, position, created_at) VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT (email) DO NOTHING",
                libsql::params![
                    user.name.clone(),
                    user.email.clone(),
                    user.role.clone(),
                    user.position.clone(),
                    format_datetime(now)
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(Error::Rejected(format!(
                "a user with email {} already exists",
                user.email
            )));
        }

        Ok(User {
            id: UserId(conn.last_insert_rowid()),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            position: user.position.clone(),
            created_at: now,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, email, role, position, created_at FROM users WHERE id = ?",
                [id.0],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let created_at_str: String = row.get(5)?;
        Ok(Some(User {
            id: UserId(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            position: row.get(4)?,
            created_at: parse_datetime(&created_at_str)?,
        }))
    }

    #[instrument(skip(self, policy), level = "debug")]
    async fn insert_policy(&self, policy: &NewPolicy, now: DateTime<Utc>) -> Result<Policy> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO policies (title, description, created_at) VALUES (?, ?, ?)",
            libsql::params![
                policy.title.clone(),
                policy.description.clone(),
                format_datetime(now)
            ],
        )
        .await?;

        Ok(Policy {
            id: PolicyId(conn.last_insert_rowid()),
            title: policy.title.clone(),
            description: policy.description.clone(),
            created_at: now,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_policy(&self, id: PolicyId) -> Result<Option<Policy>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, title, description, created_at FROM policies WHERE id = ?",
                [id.0],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let created_at_str: String = row.get(3)?;
        Ok(Some(Policy {
            id: PolicyId(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_datetime(&created_at_str)?,
        }))
    }

    #[instrument(skip(self, course), fields(title = %course.title), level = "debug")]
    async fn insert_course(&self, course: &NewCourse, now: DateTime<Utc>) -> Result<Course> {
        let conn = self.conn().await?;
        let tx = Self::begin(&conn).await?;
        let outcome = Self::apply_course(&tx, course, now).await;
        let id = Self::finish(tx, outcome).await?;

        self.get_course(id)
            .await?
            .ok_or_else(|| Error::InvalidData(format!("course {} vanished after insert", id)))
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COURSE_COLUMNS} FROM training_courses tc LEFT JOIN policies p ON p.id = tc.policy_id WHERE tc.id = ?"
                ),
                [id.0],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_course(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COURSE_COLUMNS} FROM training_courses tc LEFT JOIN policies p ON p.id = tc.policy_id ORDER BY tc.created_at DESC, tc.id DESC"
                ),
                (),
            )
            .await?;

        let mut courses = Vec::new();
        while let Some(row) = rows.next().await? {
            courses.push(Self::parse_course(&row)?);
        }
        Ok(courses)
    }

    #[instrument(skip(self), level = "debug")]
    async fn questions_by_course(&self, course: CourseId) -> Result<Vec<Question>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT q.id, q.question_text, o.id, o.option_text, o.is_correct
                 FROM questions q
                 LEFT JOIN options o ON o.question_id = q.id
                 WHERE q.course_id = ?
                 ORDER BY q.id, o.id",
                [course.0],
            )
            .await?;

        let mut questions: Vec<Question> = Vec::new();
        while let Some(row) = rows.next().await? {
            let question_id = QuestionId(row.get(0)?);
            if questions.last().is_none_or(|q| q.id != question_id) {
                questions.push(Question {
                    id: question_id,
                    question_text: row.get(1)?,
                    options: Vec::new(),
                });
            }

            let option_id: Option<i64> = row.get(2)?;
            if let (Some(option_id), Some(question)) = (option_id, questions.last_mut()) {
                let is_correct: i64 = row.get(4)?;
                question.options.push(AnswerOption {
                    id: OptionId(option_id),
                    option_text: row.get(3)?,
                    is_correct: is_correct != 0,
                });
            }
        }
        Ok(questions)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_progress(&self, user: UserId, course: CourseId) -> Result<Option<Progress>> {
        let conn = self.conn().await?;
        Self::fetch_progress(&conn, user, course).await
    }

    #[instrument(skip(self, answers), fields(answers = answers.len()), level = "debug")]
    async fn record_submission(
        &self,
        user: UserId,
        course: CourseId,
        answers: &[SubmittedAnswer],
        now: DateTime<Utc>,
    ) -> Result<SubmissionResult> {
        let conn = self.conn().await?;
        let tx = Self::begin(&conn).await?;
        let outcome = Self::apply_submission(&tx, user, course, answers, now).await;
        Self::finish(tx, outcome).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn unlock_next_course(
        &self,
        user: UserId,
        policy: PolicyId,
        completed_order: i64,
    ) -> Result<Option<CourseId>> {
        let conn = self.conn().await?;
        let tx = Self::begin(&conn).await?;
        let outcome = Self::apply_unlock(&tx, user, policy, completed_order).await;
        Self::finish(tx, outcome).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn curriculum_for_user(
        &self,
        policy: PolicyId,
        user: UserId,
    ) -> Result<Vec<CurriculumRow>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT tc.id, tc.title, tc.order_in_policy, ucp.status
                 FROM training_courses tc
                 LEFT JOIN user_course_progress ucp ON ucp.course_id = tc.id AND ucp.user_id = ?
                 WHERE tc.policy_id = ?
                 ORDER BY tc.order_in_policy",
                libsql::params![user.0, policy.0],
            )
            .await?;

        let mut curriculum = Vec::new();
        while let Some(row) = rows.next().await? {
            let status: Option<String> = row.get(3)?;
            curriculum.push(CurriculumRow {
                course_id: CourseId(row.get(0)?),
                course_title: row.get(1)?,
                order_in_policy: row.get(2)?,
                status: status.as_deref().map(parse_status).transpose()?,
            });
        }
        Ok(curriculum)
    }

    #[instrument(skip(self), level = "debug")]
    async fn policy_courses_for_user(&self, user: UserId) -> Result<Vec<PolicyCourseRow>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT p.id, p.title, ucp.status
                 FROM policies p
                 JOIN training_courses tc ON tc.policy_id = p.id
                 LEFT JOIN user_course_progress ucp ON ucp.course_id = tc.id AND ucp.user_id = ?
                 ORDER BY p.title, p.id, tc.order_in_policy",
                [user.0],
            )
            .await?;

        let mut courses = Vec::new();
        while let Some(row) = rows.next().await? {
            let status: Option<String> = row.get(2)?;
            courses.push(PolicyCourseRow {
                policy_id: PolicyId(row.get(0)?),
                policy_title: row.get(1)?,
                status: status.as_deref().map(parse_status).transpose()?,
            });
        }
        Ok(courses)
    }

    #[instrument(skip(self), level = "debug")]
    async fn course_counts(&self, learner_role: &str) -> Result<Vec<CourseCounts>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT p.id, p.title, tc.id, tc.title,
                     (SELECT COUNT(*) FROM questions q WHERE q.course_id = tc.id),
                     (SELECT COUNT(DISTINCT ucp.user_id) FROM user_course_progress ucp
                          JOIN users u ON u.id = ucp.user_id
                          WHERE ucp.course_id = tc.id AND u.role = ? AND ucp.status = ?),
                     (SELECT COUNT(DISTINCT ucp.user_id) FROM user_course_progress ucp
                          JOIN users u ON u.id = ucp.user_id
                          WHERE ucp.course_id = tc.id AND u.role = ? AND ucp.status = ?),
                     (SELECT COUNT(DISTINCT ucp.user_id) FROM user_course_progress ucp
                          JOIN users u ON u.id = ucp.user_id
                          WHERE ucp.course_id = tc.id AND u.role = ?)
                 FROM policies p
                 JOIN training_courses tc ON tc.policy_id = p.id
                 ORDER BY p.title, p.id, tc.order_in_policy",
                libsql::params![
                    learner_role,
                    ProgressStatus::Completed.as_str(),
                    learner_role,
                    ProgressStatus::InProgress.as_str(),
                    learner_role
                ],
            )
            .await?;

        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push(CourseCounts {
                policy_id: PolicyId(row.get(0)?),
                policy_title: row.get(1)?,
                course_id: CourseId(row.get(2)?),
                course_title: row.get(3)?,
                total_questions: to_count(row.get(4)?, "total_questions")?,
                completed_users: to_count(row.get(5)?, "completed_users")?,
                in_progress_users: to_count(row.get(6)?, "in_progress_users")?,
                learners_with_progress: to_count(row.get(7)?, "learners_with_progress")?,
            });
        }
        Ok(counts)
    }

    #[instrument(skip(self), level = "debug")]
    async fn count_learners(&self, learner_role: &str) -> Result<u32> {
        let conn = self.conn().await?;
        Self::count(&conn, "SELECT COUNT(*) FROM users WHERE role = ?", [learner_role]).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn course_progress_detail(
        &self,
        course: CourseId,
        learner_role: &str,
    ) -> Result<Vec<LearnerProgress>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT u.id, u.name, ucp.status, ucp.completed_date
                 FROM users u
                 LEFT JOIN user_course_progress ucp ON ucp.user_id = u.id AND ucp.course_id = ?
                 WHERE u.role = ?
                 ORDER BY u.name, u.id",
                libsql::params![course.0, learner_role],
            )
            .await?;

        let mut learners = Vec::new();
        while let Some(row) = rows.next().await? {
            let status: Option<String> = row.get(2)?;
            let completed: Option<String> = row.get(3)?;
            learners.push(LearnerProgress {
                user_id: UserId(row.get(0)?),
                user_name: row.get(1)?,
                progress_status: status.as_deref().map(parse_status).transpose()?,
                completed_date: completed.as_deref().map(parse_datetime).transpose()?,
            });
        }
        Ok(learners)
    }
}

/// Format a datetime for storage.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a datetime from storage.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidData(format!("invalid datetime: {}", s)))
}

fn parse_status(s: &str) -> Result<ProgressStatus> {
    ProgressStatus::parse(s).ok_or_else(|| Error::InvalidData(format!("invalid status: {}", s)))
}

fn to_count(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidData(format!("invalid {}: {}", column, value)))
}
