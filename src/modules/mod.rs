pub mod books;

use std::sync::Arc;

use bookstore_db::BookStore;
use bookstore_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn BookStore>) -> anyhow::Result<()> {
    registry.register(books::create_module(store))
}
