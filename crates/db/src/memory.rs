//! In-memory book storage.
//!
//! Records live in a `BTreeMap` behind an async read-write lock. Every
//! mutation holds the write lock for its whole read-check-write sequence, which
//! is what makes [`BookStore::purchase`] atomic here.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    book::{Book, BookId, NewBook},
    error::{StoreError, StoreResult},
    store::BookStore,
};

/// Thread-safe in-memory book store.
///
/// Cloning is cheap and every clone shares the same records.
#[derive(Default, Clone, Debug)]
pub struct InMemoryBookStore {
    books: Arc<RwLock<BTreeMap<BookId, Book>>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(books.values().cloned().collect())
    }

    async fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.get(&id).cloned())
    }

    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let mut books = self.books.write().await;
        let id = BookId::generate();

        if books.contains_key(&id) {
            return Err(StoreError::Backend(format!("duplicate book id {}", id)));
        }

        let book = book.into_book(id);
        books.insert(id, book.clone());

        Ok(book)
    }

    async fn purchase(&self, id: BookId) -> StoreResult<Book> {
        let mut books = self.books.write().await;
        let book = books.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if book.stock == 0 {
            return Err(StoreError::OutOfStock(id));
        }

        book.stock -= 1;
        Ok(book.clone())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.books.write().await.clear();
        Ok(())
    }
}
