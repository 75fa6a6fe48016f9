use anyhow::Context;

use bookstore_app::modules;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookstore-app bootstrap starting"
    );

    let store = bookstore_db::connect(&settings.database)
        .await
        .with_context(|| "failed to connect to the book store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store.clone())?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookstore-app bootstrap complete");

    let served = bookstore_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    store
        .shutdown()
        .await
        .with_context(|| "failed to shut down the book store")?;

    served
}
