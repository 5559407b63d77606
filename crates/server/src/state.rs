use std::sync::Arc;

use service::catalog::CatalogStore;

/// Shared router state. The catalog is owned here for the lifetime of the server.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<dyn CatalogStore>,
}

impl ServerState {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}
