//! Directory records the progression engine relies on.
//!
//! Credentials live in the external directory service; these rows only
//! carry what eligibility counts and curriculum ownership need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};
use crate::types::{PolicyId, UserId};

/// Role given to regular employees, the default learner population.
pub const DEFAULT_LEARNER_ROLE: &str = "Empleado";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub position: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(TrainingError::Validation(
                "user name and email are required".into(),
            ));
        }
        if self.role.trim().is_empty() {
            return Err(TrainingError::Validation("user role is required".into()));
        }
        Ok(())
    }
}

/// A compliance policy owning an ordered curriculum of courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TrainingError::Validation("policy title is required".into()));
        }
        Ok(())
    }
}
