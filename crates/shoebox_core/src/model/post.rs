//! Post authored by a user.

use super::{RecordId, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Post belonging to one user via `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Storage-assigned identifier. Zero until persisted.
    pub id: RecordId,
    pub title: String,
    pub body: String,
    /// Owning user. Must reference an existing users row at creation time.
    pub user_id: RecordId,
    pub created_at: i64,
    pub updated_at: i64,
    /// Soft-delete tombstone timestamp. `None` means the record is active.
    pub deleted_at: Option<i64>,
}

impl Post {
    /// Creates an unpersisted post with generated fields zeroed.
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: RecordId) -> Self {
        Self {
            id: 0,
            title: title.into(),
            body: body.into(),
            user_id,
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        Self::validate_title(&self.title)?;
        Self::validate_author(self.user_id)
    }

    pub fn validate_title(title: &str) -> Result<(), RecordValidationError> {
        if title.trim().is_empty() {
            return Err(RecordValidationError::MissingPostTitle);
        }
        Ok(())
    }

    pub fn validate_author(user_id: RecordId) -> Result<(), RecordValidationError> {
        if user_id <= 0 {
            return Err(RecordValidationError::MissingPostAuthor);
        }
        Ok(())
    }

    /// Returns whether this record is visible to default reads.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
