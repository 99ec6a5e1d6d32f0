//! Course authoring types: micro-courses, quiz questions and options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};
use crate::progress::Progress;
use crate::types::{CourseId, OptionId, PolicyId, QuestionId};

/// A training micro-course, optionally part of a policy's curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub policy_id: Option<PolicyId>,
    pub policy_title: Option<String>,
    pub title: String,
    pub description: String,
    /// Free-form kind of material ("video", "pdf", ...).
    pub material_type: String,
    /// Opaque link to the material; passed through unchanged.
    pub material_link: Option<String>,
    /// Position within the policy curriculum, starting at 1.
    pub order_in_policy: i64,
    pub created_at: DateTime<Utc>,
}

/// An answer option as seen by course authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub option_text: String,
    pub is_correct: bool,
}

/// A quiz question with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub options: Vec<AnswerOption>,
}

/// An answer option as shown to learners, without the correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerOption {
    pub id: OptionId,
    pub option_text: String,
}

/// A quiz question as shown to learners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerQuestion {
    pub id: QuestionId,
    pub question_text: String,
    pub options: Vec<LearnerOption>,
}

impl From<Question> for LearnerQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            options: question
                .options
                .into_iter()
                .map(|option| LearnerOption {
                    id: option.id,
                    option_text: option.option_text,
                })
                .collect(),
        }
    }
}

/// Course plus its full question bank (authoring view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseWithQuestions {
    #[serde(flatten)]
    pub course: Course,
    pub questions: Vec<Question>,
}

/// Course, quiz and the learner's own progress (learner view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetailsForUser {
    pub course: Course,
    pub questions: Vec<LearnerQuestion>,
    pub user_progress: Option<Progress>,
}

/// Option to author alongside a new question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOption {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Question to author alongside a new course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub options: Vec<NewOption>,
}

/// A course aggregate to insert in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    #[serde(default)]
    pub policy_id: Option<PolicyId>,
    pub title: String,
    pub description: String,
    pub material_type: String,
    #[serde(default)]
    pub material_link: Option<String>,
    pub order_in_policy: i64,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

impl NewCourse {
    /// Check the aggregate before it reaches the store.
    ///
    /// Every question must carry at least one option flagged correct,
    /// otherwise the course could never be completed.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TrainingError::Validation("course title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(TrainingError::Validation(
                "course description is required".into(),
            ));
        }
        if self.material_type.trim().is_empty() {
            return Err(TrainingError::Validation("material type is required".into()));
        }
        if self.order_in_policy < 1 {
            return Err(TrainingError::Validation(format!(
                "order_in_policy must be at least 1, got {}",
                self.order_in_policy
            )));
        }

        for (idx, question) in self.questions.iter().enumerate() {
            let number = idx + 1;
            if question.question_text.trim().is_empty() {
                return Err(TrainingError::Validation(format!(
                    "question {number} has no text"
                )));
            }
            if question.options.is_empty() {
                return Err(TrainingError::Validation(format!(
                    "question {number} has no options"
                )));
            }
            if !question.options.iter().any(|option| option.is_correct) {
                return Err(TrainingError::Validation(format!(
                    "question {number} has no correct option"
                )));
            }
        }

        Ok(())
    }
}
