use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookstore_app::modules;
use bookstore_db::{BookId, BookStore, InMemoryBookStore, NewBook};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

struct TestApp {
    router: Router,
    store: Arc<InMemoryBookStore>,
}

async fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryBookStore::new());
    let settings = Settings::default();

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store.clone()).unwrap();
    registry
        .init_modules(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();

    TestApp {
        router: bookstore_http::build_router(&registry, &settings),
        store,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn purchase(id: BookId) -> Request<Body> {
    Request::post(format!("/api/books/{}/purchase", id))
        .body(Body::empty())
        .unwrap()
}

async fn seed(store: &InMemoryBookStore, stock: i64) -> BookId {
    store
        .insert(NewBook::new("Test Book", "Test Author", 10.99, stock).unwrap())
        .await
        .unwrap()
        .id
}

/// Fire `buyers` purchase requests at once; returns every response status.
async fn concurrent_purchases(app: &TestApp, id: BookId, buyers: usize) -> Vec<StatusCode> {
    let handles: Vec<_> = (0..buyers)
        .map(|_| {
            let router = app.router.clone();
            tokio::spawn(async move { router.oneshot(purchase(id)).await.unwrap().status() })
        })
        .collect();

    let mut statuses = Vec::with_capacity(buyers);
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    statuses
}

fn count(statuses: &[StatusCode], wanted: StatusCode) -> usize {
    statuses.iter().filter(|status| **status == wanted).count()
}

#[tokio::test]
async fn listing_with_no_books_is_empty() {
    let app = spawn_app().await;
    let (status, body) = send(&app.router, get("/api/books")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn created_book_is_listed_and_fetchable() {
    let app = spawn_app().await;
    let (status, created) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Dune", "author": "Frank Herbert", "price": 10.99, "stock": 3}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["price"], 10.99);
    assert_eq!(created["stock"], 3);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app.router, get(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, listed) = send(&app.router, get("/api/books")).await;
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = spawn_app().await;
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Test Book", "author": "Test Author", "price": -10.99, "stock": 5}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "price");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_stock_is_rejected() {
    let app = spawn_app().await;
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Test Book", "author": "Test Author", "price": 10.99, "stock": -5}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "stock");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn form_style_string_numbers_are_accepted() {
    let app = spawn_app().await;
    let (status, created) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Dune", "author": "Frank Herbert", "price": "10.99", "stock": "5"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["price"], 10.99);
    assert_eq!(created["stock"], 5);
    assert_eq!(app.store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_or_negative_string_numbers_are_rejected() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Dune", "author": "Frank Herbert", "price": "cheap", "stock": "5"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/books",
            &json!({"title": "Dune", "author": "Frank Herbert", "price": "10.99", "stock": "-5"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "stock");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_field_and_broken_json_are_rejected() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        post_json("/api/books", &json!({"title": "Dune", "price": 1.0, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let broken = Request::post("/api/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, body) = send(&app.router, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, get("/api/books/invalid-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid book ID");

    let malformed_purchase = Request::post("/api/books/invalid-id/purchase")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, malformed_purchase).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid book ID");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = spawn_app().await;
    let id = BookId::generate();

    let (status, body) = send(&app.router, get(&format!("/api/books/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");

    let (status, body) = send(&app.router, purchase(id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn purchase_returns_receipt_with_updated_book() {
    let app = spawn_app().await;
    let id = seed(&app.store, 2).await;

    let (status, body) = send(&app.router, purchase(id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Purchase successful");
    assert_eq!(body["book"]["id"], id.to_string());
    assert_eq!(body["book"]["stock"], 1);
}

#[tokio::test]
async fn purchase_at_zero_stock_is_rejected_without_mutation() {
    let app = spawn_app().await;
    let id = seed(&app.store, 0).await;

    let (status, body) = send(&app.router, purchase(id)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book out of stock");
    assert_eq!(body["code"], "out_of_stock");
    assert_eq!(app.store.get(id).await.unwrap().unwrap().stock, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_concurrent_purchases_of_last_copy() {
    let app = spawn_app().await;
    let id = seed(&app.store, 1).await;

    let statuses = concurrent_purchases(&app, id, 2).await;

    assert_eq!(count(&statuses, StatusCode::OK), 1);
    assert_eq!(count(&statuses, StatusCode::NOT_FOUND), 1);
    assert_eq!(app.store.get(id).await.unwrap().unwrap().stock, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_concurrent_purchases_of_three_copies() {
    let app = spawn_app().await;
    let id = seed(&app.store, 3).await;

    let statuses = concurrent_purchases(&app, id, 5).await;

    assert_eq!(count(&statuses, StatusCode::OK), 3);
    assert_eq!(count(&statuses, StatusCode::NOT_FOUND), 2);
    assert_eq!(app.store.get(id).await.unwrap().unwrap().stock, 0);
}

#[tokio::test]
async fn openapi_lists_book_routes() {
    let app = spawn_app().await;
    let (status, spec) = send(&app.router, get("/docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/books"]["get"].is_object());
    assert!(spec["paths"]["/api/books"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{id}/purchase"]["post"].is_object());
    assert!(spec["components"]["schemas"]["PurchaseReceipt"].is_object());
}

#[tokio::test]
async fn module_health_route_is_mounted() {
    let app = spawn_app().await;
    let response = app
        .router
        .clone()
        .oneshot(get("/api/books/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
