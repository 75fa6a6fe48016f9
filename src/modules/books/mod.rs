pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use bookstore_db::{Book, BookId, BookStore};
use bookstore_http::error::AppError;
use bookstore_kernel::{InitCtx, Module};

use models::{CreateBook, PurchaseReceipt};

/// Shared handler state: the store handle injected at construction
#[derive(Clone)]
pub struct BooksState {
    store: Arc<dyn BookStore>,
}

/// Books inventory module: listing, creation, lookup, and purchase
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            state: BooksState { store },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        // Touch the store so an unreachable backend fails startup
        let existing = self.state.store.list().await?.len();

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            existing,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/health", get(health_check))
            .route("/{id}", get(get_book))
            .route("/{id}/purchase", post(purchase_book))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_parameter = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book identifier",
            "schema": { "type": "string", "format": "uuid" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every book in the inventory",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": book_response("The created book"),
                            "400": error_response("Malformed request body"),
                            "422": error_response("Field validation failed"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_parameter.clone()],
                        "responses": {
                            "200": book_response("The requested book"),
                            "400": error_response("Invalid book ID"),
                            "404": error_response("Book not found"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/{id}/purchase": {
                    "post": {
                        "summary": "Purchase one copy",
                        "description": "Atomically decrements stock by one when stock is positive.",
                        "tags": ["Books"],
                        "parameters": [id_parameter],
                        "responses": {
                            "200": {
                                "description": "Purchase successful",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/PurchaseReceipt" }
                                    }
                                }
                            },
                            "400": error_response("Invalid book ID"),
                            "404": error_response("Book not found or out of stock"),
                            "500": error_response("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "format": "uuid",
                                "description": "Unique identifier for the book"
                            },
                            "title": { "type": "string", "description": "Title of the book" },
                            "author": { "type": "string", "description": "Author of the book" },
                            "price": { "type": "number", "minimum": 0, "description": "Unit price" },
                            "stock": { "type": "integer", "minimum": 0, "description": "Copies on hand" }
                        },
                        "required": ["id", "title", "author", "price", "stock"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 },
                            "price": {
                                "oneOf": [
                                    { "type": "number", "minimum": 0 },
                                    { "type": "string", "description": "Numeric text, as sent by HTML forms" }
                                ]
                            },
                            "stock": {
                                "oneOf": [
                                    { "type": "integer", "minimum": 0 },
                                    { "type": "string", "description": "Numeric text, as sent by HTML forms" }
                                ]
                            }
                        },
                        "required": ["title", "author", "price", "stock"]
                    },
                    "PurchaseReceipt": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["message", "book"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(state.store.list().await?))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id: BookId = id.parse()?;

    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Book not found"))
}

async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(request) = payload.map_err(reject_payload)?;
    let book = state.store.insert(request.validate()?).await?;

    tracing::info!(book_id = %book.id, stock = book.stock, "book created");
    Ok(Json(book))
}

/// Sell one copy; the store performs the stock check and decrement atomically
async fn purchase_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseReceipt>, AppError> {
    let id: BookId = id.parse()?;
    let book = state.store.purchase(id).await?;

    tracing::info!(book_id = %id, remaining = book.stock, "purchase completed");
    Ok(Json(PurchaseReceipt::new(book)))
}

fn reject_payload(rejection: JsonRejection) -> AppError {
    // Well-formed JSON with missing or mistyped fields is a validation failure
    if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
        AppError::validation(Vec::new(), rejection.body_text())
    } else {
        AppError::bad_request(rejection.body_text())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
