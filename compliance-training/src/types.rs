//! Identifier types for training entities.
//!
//! Rows are keyed by the store's integer primary keys, so every identifier
//! is a thin newtype over `i64` that serializes as a bare number.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

row_id!(
    /// Identifier of a directory user (learner or administrator).
    UserId
);
row_id!(
    /// Identifier of a compliance policy.
    PolicyId
);
row_id!(
    /// Identifier of a training micro-course.
    CourseId
);
row_id!(
    /// Identifier of a quiz question.
    QuestionId
);
row_id!(
    /// Identifier of an answer option.
    OptionId
);
