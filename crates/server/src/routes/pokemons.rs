use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use models::{NewPokemon, Pokemon};
use serde::Serialize;
use serde_json::{Map, Value};
use service::pagination::{Page, Pagination};
use tracing::{debug, warn};

use crate::errors::{ApiError, INVALID_BODY_MESSAGE, INVALID_PATCH_MESSAGE};
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub message: &'static str,
    pub pokemon: Pokemon,
}

/// Ids that do not parse can never match, so they read as a lookup miss.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse::<u64>().map_err(|_| ApiError::not_found())
}

/// Body decoding failures. A well-formed body with unusable fields gets
/// `shape_message`; anything else is reported as an invalid body.
fn body_error(rejection: JsonRejection, shape_message: &str) -> ApiError {
    warn!(error = %rejection.body_text(), "rejected request body");
    match rejection {
        JsonRejection::JsonDataError(_) => ApiError::bad_request(shape_message),
        _ => ApiError::bad_request(INVALID_BODY_MESSAGE),
    }
}

/// GET /api/pokemons?page=N
///
/// A repeated `page` key uses the first value.
pub async fn list_pokemons(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Page<Pokemon>> {
    let raw = pairs.iter().find(|(k, _)| k == "page").map(|(_, v)| v.as_str());
    let pagination = Pagination::from_query(raw);
    let page = state.catalog.list_page(pagination).await;
    debug!(
        page = pagination.page,
        returned = page.data.len(),
        total = page.pagination.total_count,
        "list pokemons"
    );
    Json(page)
}

/// GET /api/pokemons/search/:name
pub async fn search_pokemon(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Pokemon>, ApiError> {
    Ok(Json(state.catalog.find_by_name(&name).await?))
}

/// GET /api/pokemons/:id
pub async fn get_pokemon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Pokemon>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.find_by_id(id).await?))
}

/// POST /api/pokemons
pub async fn create_pokemon(
    State(state): State<ServerState>,
    payload: Result<Json<NewPokemon>, JsonRejection>,
) -> Result<(StatusCode, Json<Pokemon>), ApiError> {
    let Json(input) = payload.map_err(|e| body_error(e, "Missing required fields"))?;
    let created = state.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/pokemons/:id
pub async fn update_pokemon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Pokemon>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(|e| body_error(e, INVALID_PATCH_MESSAGE))?;
    Ok(Json(state.catalog.update(id, patch).await?))
}

/// DELETE /api/pokemons/:id
pub async fn delete_pokemon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutput>, ApiError> {
    let id = parse_id(&id)?;
    let pokemon = state.catalog.delete(id).await?;
    Ok(Json(DeleteOutput { message: "Pokemon deleted", pokemon }))
}
