use serde::{Deserialize, Serialize};

use bookstore_db::{Book, NewBook, StoreResult};

use crate::utils::string_or_number;

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Unit price, as a number or a numeric string
    #[serde(deserialize_with = "string_or_number")]
    pub price: f64,
    /// Copies on hand; signed so negative input reaches validation
    #[serde(deserialize_with = "string_or_number")]
    pub stock: i64,
}

impl CreateBook {
    /// Check field constraints and produce an insertable book.
    pub fn validate(self) -> StoreResult<NewBook> {
        NewBook::new(self.title, self.author, self.price, self.stock)
    }
}

/// Response body of a successful purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub message: String,
    /// The book after its stock was decremented
    pub book: Book,
}

impl PurchaseReceipt {
    pub fn new(book: Book) -> Self {
        Self {
            message: "Purchase successful".to_string(),
            book,
        }
    }
}
