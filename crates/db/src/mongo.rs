//! MongoDB book storage.
//!
//! Books are stored as `{_id, title, author, price, stock}` documents with the
//! id in its hyphenated text form. Purchases are a single `findOneAndUpdate`
//! whose filter carries the `stock > 0` precondition, so the server evaluates
//! the check and the decrement as one step.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, ReturnDocument},
    Client, Collection,
};

use bookstore_kernel::settings::DatabaseSettings;

use crate::{
    book::{Book, BookId, NewBook},
    error::{StoreError, StoreResult},
    store::BookStore,
};

#[derive(Debug, Clone)]
pub struct MongoBookStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoBookStore {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }

    /// Connect using the configured URI and ping the server so a bad address
    /// fails at startup rather than on the first request.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let client = Client::with_uri_str(&settings.uri).await?;

        client
            .database(&settings.name)
            .run_command(doc! { "ping": 1 })
            .await?;

        tracing::info!(
            database = %settings.name,
            collection = %settings.collection,
            "connected to MongoDB"
        );

        Ok(Self::new(client, &settings.name, &settings.collection))
    }

    fn id_filter(id: BookId) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn to_document(book: &Book) -> Document {
        doc! {
            "_id": book.id.to_string(),
            "title": book.title.as_str(),
            "author": book.author.as_str(),
            "price": book.price,
            "stock": i64::from(book.stock),
        }
    }

    fn from_document(document: &Document) -> StoreResult<Book> {
        let raw_id = document.get_str("_id")?;
        let id = raw_id
            .parse::<BookId>()
            .map_err(|_| StoreError::Serialization(format!("stored id '{}' is not a book id", raw_id)))?;

        let price = match document.get("price") {
            Some(Bson::Double(value)) => *value,
            Some(Bson::Int32(value)) => f64::from(*value),
            Some(Bson::Int64(value)) => *value as f64,
            other => {
                return Err(StoreError::Serialization(format!(
                    "book {} has non-numeric price {:?}",
                    id, other
                )))
            }
        };

        let stock = match document.get("stock") {
            Some(Bson::Int32(value)) => i64::from(*value),
            Some(Bson::Int64(value)) => *value,
            other => {
                return Err(StoreError::Serialization(format!(
                    "book {} has non-integer stock {:?}",
                    id, other
                )))
            }
        };
        let stock = u32::try_from(stock).map_err(|_| {
            StoreError::Serialization(format!("book {} has out-of-range stock {}", id, stock))
        })?;

        Ok(Book {
            id,
            title: document.get_str("title")?.to_string(),
            author: document.get_str("author")?.to_string(),
            price,
            stock,
        })
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let mut options = FindOptions::default();
        options.sort = Some(doc! { "_id": 1 });

        self.collection
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect::<Vec<Document>>()
            .await?
            .iter()
            .map(Self::from_document)
            .collect()
    }

    async fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        self.collection
            .find_one(Self::id_filter(id))
            .await?
            .as_ref()
            .map(Self::from_document)
            .transpose()
    }

    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let book = book.into_book(BookId::generate());

        self.collection
            .insert_one(Self::to_document(&book))
            .await?;

        Ok(book)
    }

    async fn purchase(&self, id: BookId) -> StoreResult<Book> {
        let mut filter = Self::id_filter(id);
        filter.insert("stock", doc! { "$gt": 0 });

        let updated = self
            .collection
            .find_one_and_update(filter, doc! { "$inc": { "stock": -1 } })
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(document) => Self::from_document(&document),
            // Nothing matched: tell a missing record apart from an empty shelf.
            None => match self.get(id).await? {
                Some(_) => Err(StoreError::OutOfStock(id)),
                None => Err(StoreError::NotFound(id)),
            },
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        self.collection.delete_many(doc! {}).await?;
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trip_preserves_fields() {
        let book = NewBook::new("Dune", "Frank Herbert", 12.5, 4)
            .unwrap()
            .into_book(BookId::generate());

        let document = MongoBookStore::to_document(&book);

        assert_eq!(document.get_str("_id").unwrap(), book.id.to_string());
        assert_eq!(MongoBookStore::from_document(&document).unwrap(), book);
    }

    #[test]
    fn int32_stock_and_integer_price_are_accepted() {
        let id = BookId::generate();
        let document = doc! {
            "_id": id.to_string(),
            "title": "Dune",
            "author": "Frank Herbert",
            "price": 12,
            "stock": 3,
        };

        let book = MongoBookStore::from_document(&document).unwrap();

        assert_eq!(book.price, 12.0);
        assert_eq!(book.stock, 3);
    }

    #[test]
    fn negative_stored_stock_is_a_serialization_error() {
        let document = doc! {
            "_id": BookId::generate().to_string(),
            "title": "Dune",
            "author": "Frank Herbert",
            "price": 1.0,
            "stock": -1,
        };

        assert!(matches!(
            MongoBookStore::from_document(&document),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn foreign_object_id_is_a_serialization_error() {
        let document = doc! {
            "_id": "65f0c0ffee0000000000abcd",
            "title": "Dune",
            "author": "Frank Herbert",
            "price": 1.0,
            "stock": 1,
        };

        assert!(matches!(
            MongoBookStore::from_document(&document),
            Err(StoreError::Serialization(_))
        ));
    }
}
