//! Account user.
//!
//! # Invariants
//! - `email` is unique among records that are not tombstoned.
//! - A user owns zero or more posts (`posts.user_id` foreign key).

use super::{RecordId, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Account user owning posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier. Zero until persisted.
    pub id: RecordId,
    /// Display name, required.
    pub name: String,
    /// Unique contact address.
    pub email: String,
    /// Unix epoch milliseconds, assigned by storage on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by storage on every write.
    pub updated_at: i64,
    /// Soft-delete tombstone timestamp. `None` means the record is active.
    pub deleted_at: Option<i64>,
}

impl User {
    /// Creates an unpersisted user with generated fields zeroed.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        Self::validate_name(&self.name)?;
        Self::validate_email(&self.email)
    }

    pub fn validate_name(name: &str) -> Result<(), RecordValidationError> {
        if name.trim().is_empty() {
            return Err(RecordValidationError::MissingUserName);
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> Result<(), RecordValidationError> {
        if email.trim().is_empty() {
            return Err(RecordValidationError::MissingUserEmail);
        }
        Ok(())
    }

    /// Returns whether this record is visible to default reads.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
