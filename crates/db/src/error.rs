//! Error and result types for book store operations.

use thiserror::Error;

use crate::book::{BookId, FieldViolation};

/// Everything that can go wrong while reading or mutating the book collection.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The supplied identifier is not a well-formed book id.
    #[error("invalid book id '{0}'")]
    InvalidIdentifier(String),
    /// No record exists with the given id.
    #[error("book {0} not found")]
    NotFound(BookId),
    /// The record exists but has no stock left to sell.
    #[error("book {0} is out of stock")]
    OutOfStock(BookId),
    /// An insert request violated one or more field constraints.
    #[error("invalid book: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),
    /// The underlying storage backend failed.
    #[error("backend error: {0}")]
    Backend(String),
    /// A stored document could not be converted into a book.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{} {}", violation.field, violation.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<mongodb::bson::document::ValueAccessError> for StoreError {
    fn from(err: mongodb::bson::document::ValueAccessError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
