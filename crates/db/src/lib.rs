//! Book inventory storage.
//!
//! The [`BookStore`] trait is the only way request handlers touch persisted
//! books. Two backends implement it:
//!
//! - [`InMemoryBookStore`] for local runs and tests
//! - [`MongoBookStore`] for durable storage
//!
//! Use [`connect`] to build whichever backend the settings select.

use std::sync::Arc;

use bookstore_kernel::settings::{DatabaseBackend, DatabaseSettings};

pub mod book;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

pub use book::{Book, BookId, FieldViolation, NewBook};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBookStore;
pub use mongo::MongoBookStore;
pub use store::BookStore;

/// Build the backend selected by `settings.backend`.
pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Arc<dyn BookStore>> {
    match settings.backend {
        DatabaseBackend::Memory => {
            tracing::info!(target: "bookstore-db", "using in-memory book store");
            let store: Arc<dyn BookStore> = Arc::new(InMemoryBookStore::new());
            Ok(store)
        }
        DatabaseBackend::Mongodb => {
            tracing::info!(target: "bookstore-db", database = %settings.name, "connecting to MongoDB");
            let store: Arc<dyn BookStore> = Arc::new(MongoBookStore::connect(settings).await?);
            Ok(store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_settings_connect_to_memory_store() {
        let store = connect(&DatabaseSettings::default()).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        store.shutdown().await.unwrap();
    }
}
