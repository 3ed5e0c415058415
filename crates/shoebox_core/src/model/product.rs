//! Product catalog entry.
//!
//! # Invariants
//! - `code` is unique among records that are not tombstoned.
//! - `deleted_at` is the soft-delete tombstone; `None` means active.

use super::{RecordId, RecordValidationError};
use serde::{Deserialize, Serialize};

/// Maximum accepted length of a product code, in characters.
pub const PRODUCT_CODE_MAX_CHARS: usize = 10;

/// Catalog product with a unique short code and an integer price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Storage-assigned identifier. Zero until persisted.
    pub id: RecordId,
    /// Unique catalog code, at most [`PRODUCT_CODE_MAX_CHARS`] characters.
    pub code: String,
    /// Non-negative price in minor currency units.
    pub price: i64,
    /// Unix epoch milliseconds, assigned by storage on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by storage on every write.
    pub updated_at: i64,
    /// Soft-delete tombstone timestamp. `None` means the record is active.
    pub deleted_at: Option<i64>,
}

impl Product {
    /// Creates an unpersisted product with generated fields zeroed.
    pub fn new(code: impl Into<String>, price: i64) -> Self {
        Self {
            id: 0,
            code: code.into(),
            price,
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        Self::validate_code(&self.code)?;
        Self::validate_price(self.price)
    }

    pub fn validate_code(code: &str) -> Result<(), RecordValidationError> {
        if code.trim().is_empty() {
            return Err(RecordValidationError::MissingProductCode);
        }
        let chars = code.chars().count();
        if chars > PRODUCT_CODE_MAX_CHARS {
            return Err(RecordValidationError::ProductCodeTooLong {
                max: PRODUCT_CODE_MAX_CHARS,
                actual: chars,
            });
        }
        Ok(())
    }

    pub fn validate_price(price: i64) -> Result<(), RecordValidationError> {
        if price < 0 {
            return Err(RecordValidationError::NegativePrice(price));
        }
        Ok(())
    }

    /// Returns whether this record is visible to default reads.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
