//! Domain models for the record store.
//!
//! # Responsibility
//! - Define the entity structs persisted by the repository layer.
//! - Own per-entity validation run before every write.
//!
//! # Invariants
//! - Every entity declares its own identifier/timestamp fields directly;
//!   there is no shared base-model struct.
//! - The deletion timestamp is the source of truth for tombstone state.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod post;
pub mod product;
pub mod task;
pub mod user;

/// Stable identifier assigned by the storage engine on insert.
///
/// Identifiers are strictly increasing and never reused. The zero value marks
/// a record that has not been persisted yet.
pub type RecordId = i64;

/// Validation failure raised before a write reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingProductCode,
    ProductCodeTooLong { max: usize, actual: usize },
    NegativePrice(i64),
    MissingUserName,
    MissingUserEmail,
    MissingPostTitle,
    MissingPostAuthor,
    MissingTaskDescription,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProductCode => write!(f, "product code must not be empty"),
            Self::ProductCodeTooLong { max, actual } => {
                write!(f, "product code is {actual} chars, limit is {max}")
            }
            Self::NegativePrice(price) => write!(f, "product price must not be negative: {price}"),
            Self::MissingUserName => write!(f, "user name must not be empty"),
            Self::MissingUserEmail => write!(f, "user email must not be empty"),
            Self::MissingPostTitle => write!(f, "post title must not be empty"),
            Self::MissingPostAuthor => write!(f, "post must reference an author user id"),
            Self::MissingTaskDescription => write!(f, "task description must not be empty"),
        }
    }
}

impl Error for RecordValidationError {}
