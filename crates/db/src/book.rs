//! The book record and its validated insert form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// System-assigned identifier of a book record.
///
/// Ids are time-ordered UUIDs, so sorting by id lists books in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    /// Allocate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BookId {
    type Err = StoreError;

    fn from_str(raw: &str) -> StoreResult<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::InvalidIdentifier(raw.to_string()))
    }
}

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub stock: u32,
}

/// One failed field constraint on an insert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub error: &'static str,
}

impl FieldViolation {
    fn new(field: &'static str, error: &'static str) -> Self {
        Self { field, error }
    }
}

/// Insert request that has passed every field constraint.
///
/// Stores only accept this type, so an invalid record can never be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    title: String,
    author: String,
    price: f64,
    stock: u32,
}

impl NewBook {
    /// Validate raw field values, reporting every violation at once.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        price: f64,
        stock: i64,
    ) -> StoreResult<Self> {
        let title = title.into().trim().to_string();
        let author = author.into().trim().to_string();
        let mut violations = Vec::new();

        if title.is_empty() {
            violations.push(FieldViolation::new("title", "must not be empty"));
        }
        if author.is_empty() {
            violations.push(FieldViolation::new("author", "must not be empty"));
        }
        if !price.is_finite() {
            violations.push(FieldViolation::new("price", "must be a finite number"));
        } else if price < 0.0 {
            violations.push(FieldViolation::new("price", "must not be negative"));
        }

        let stock = match u32::try_from(stock) {
            Ok(stock) => stock,
            Err(_) if stock < 0 => {
                violations.push(FieldViolation::new("stock", "must not be negative"));
                0
            }
            Err(_) => {
                violations.push(FieldViolation::new("stock", "is too large"));
                0
            }
        };

        if !violations.is_empty() {
            return Err(StoreError::Validation(violations));
        }

        Ok(Self {
            title,
            author,
            price,
            stock,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Attach the id the store assigned.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            stock: self.stock,
        }
    }
}
