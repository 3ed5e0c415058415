//! Checklist task.
//!
//! Tasks carry no deletion timestamp: the type has no soft-delete capability,
//! so deletes always remove the row.

use super::{RecordId, RecordValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Storage-assigned identifier. Zero until persisted.
    pub id: RecordId,
    pub description: String,
    pub done: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Creates an unpersisted task with generated fields zeroed.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: 0,
            description: description.into(),
            done: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        Self::validate_description(&self.description)
    }

    pub fn validate_description(description: &str) -> Result<(), RecordValidationError> {
        if description.trim().is_empty() {
            return Err(RecordValidationError::MissingTaskDescription);
        }
        Ok(())
    }
}
