//! Training progression engine for the compliance backend.
//!
//! Policies own an ordered curriculum of micro-courses. Each course ends in
//! a quiz; answering every question correctly completes the course and
//! unlocks the next one for that learner.
//!
//! # Architecture
//!
//! - **Rules** ([`progress`], [`summary`]) are pure functions over rows:
//!   completion, `completed_date` evolution, curriculum lock derivation,
//!   and monitoring aggregates
//! - **Storage** ([`TrainingStore`]) persists rows and scopes every
//!   multi-row write in one transaction
//! - **Engine** ([`TrainingEngine`]) validates input and chains completion
//!   into unlocking

mod course;
mod directory;
mod engine;
mod error;
pub mod progress;
pub mod storage;
pub mod summary;
mod types;

// Authoring types
pub use course::{
    AnswerOption, Course, CourseDetailsForUser, CourseWithQuestions, LearnerOption,
    LearnerQuestion, NewCourse, NewOption, NewQuestion, Question,
};

// Directory types
pub use directory::{DEFAULT_LEARNER_ROLE, NewPolicy, NewUser, Policy, User};

// Engine
pub use engine::TrainingEngine;

// Errors
pub use error::{Result, TrainingError};

// Progress types
pub use progress::{
    ActionStatus, CourseProgressView, PolicyCourseStatus, PolicyStatus, Progress, ProgressStatus,
    SubmissionResult, SubmittedAnswer,
};

// Monitoring types
pub use summary::{LearnerProgress, MicroCourseSummary, PolicyProgressSummary};

// ID types
pub use types::{CourseId, OptionId, PolicyId, QuestionId, UserId};

// Storage (re-export from storage module)
pub use storage::{TrainingStore, TursoTrainingStore};
