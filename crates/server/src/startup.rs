use std::{future::Future, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::{catalog::CatalogStore, file::pokemon_store::PokemonStore};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load the catalog named by `config` and build the router around it.
pub async fn build_app(config: &AppConfig) -> Result<Router, StartupError> {
    let catalog = &config.catalog;
    common::env::ensure_env(&catalog.assets_dir, &catalog.data_file).await?;

    let store = PokemonStore::new(&catalog.data_file, catalog.public_base_url.clone()).await?;
    info!(data_file = %catalog.data_file, pokemons = store.len().await, "catalog loaded");

    let store: Arc<dyn CatalogStore> = store;
    let state = ServerState::new(store);
    Ok(routes::build_router(state, build_cors(), &catalog.assets_dir))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(config: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&config).await?;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "pokemon api listening");
    info!("  GET    /api/pokemons?page=N");
    info!("  GET    /api/pokemons/search/:name");
    info!("  GET    /api/pokemons/:id");
    info!("  POST   /api/pokemons");
    info!("  PUT    /api/pokemons/:id");
    info!("  DELETE /api/pokemons/:id");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(%addr, "pokemon api stopped");
    Ok(())
}

/// Public entry: serve until Ctrl+C.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    serve(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
