pub mod pokemons;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::{Health, ServiceInfo};

use crate::state::ServerState;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo { message: "Pokemon API Server", version: API_VERSION })
}

/// Build the full application router: catalog API, root info, health and static assets.
pub fn build_router(state: ServerState, cors: CorsLayer, assets_dir: &str) -> Router {
    let api = Router::new()
        .route("/api/pokemons", get(pokemons::list_pokemons).post(pokemons::create_pokemon))
        .route("/api/pokemons/search/:name", get(pokemons::search_pokemon))
        .route(
            "/api/pokemons/:id",
            get(pokemons::get_pokemon)
                .put(pokemons::update_pokemon)
                .delete(pokemons::delete_pokemon),
        );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .nest_service("/assets", ServeDir::new(assets_dir))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
