//! HTTP server facade for the bookstore service with Axum, error handling, and
//! OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use bookstore_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = format!("{}:{}", settings.server.host, settings.server.port);
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, settings);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    serve(listener, app, shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let local_addr = listener
        .local_addr()
        .context("failed to read listener address")?;
    tracing::info!("HTTP server listening on http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new()
        .route("/", get(welcome))
        .route("/healthz", get(health_check));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the bookstore API" }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving rather than exit at once.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn welcome_and_health_routes() {
        let app = build_router(&ModuleRegistry::new(), &Settings::default());

        let (status, body) = get_json(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the bookstore API");

        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_documents_are_served() {
        let app = build_router(&ModuleRegistry::new(), &Settings::default());

        let (status, raw) = get_json(app.clone(), "/docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(raw["info"]["title"], "Bookstore API");

        let (status, typed) = get_json(app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(typed["info"]["title"], "Bookstore API");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = build_router(&ModuleRegistry::new(), &Settings::default());
        let response = app
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let app = build_router(&ModuleRegistry::new(), &Settings::default());

        serve(listener, app, async {}).await.unwrap();
    }
}
