//! Storage abstraction for the book collection.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    book::{Book, BookId, NewBook},
    error::StoreResult,
};

/// Abstract interface over book storage backends.
///
/// Implementations are shared across request handlers as `Arc<dyn BookStore>`
/// and must tolerate concurrent callers.
///
/// # Atomicity
///
/// [`BookStore::purchase`] must perform the stock check and the decrement as a
/// single step relative to every other caller: either through a conditional
/// update evaluated by the backend itself, or by holding a lock across the
/// read, the check, and the write.
#[async_trait]
pub trait BookStore: Send + Sync + Debug {
    /// Every record, in creation order.
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// The record with the given id, if any.
    async fn get(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// Persist a new record under a freshly assigned id.
    async fn insert(&self, book: NewBook) -> StoreResult<Book>;

    /// Decrement stock by one if and only if it is positive.
    ///
    /// Returns the updated record, [`StoreError::NotFound`] when no such record
    /// exists, or [`StoreError::OutOfStock`] when its stock is zero. Failures
    /// never mutate the record.
    ///
    /// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
    /// [`StoreError::OutOfStock`]: crate::error::StoreError::OutOfStock
    async fn purchase(&self, id: BookId) -> StoreResult<Book>;

    /// Remove every record.
    async fn clear(&self) -> StoreResult<()>;

    /// Release backend resources. The store must not be used afterwards.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}
