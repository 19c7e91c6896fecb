use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pokeprice_core::SearchResponse;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pokemon: Option<String>,
    grade: Option<String>,
}

pub(super) async fn search_cards(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(pokemon) = params
        .pokemon
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    else {
        return Err(ApiError::bad_request("pokemon is required"));
    };

    tracing::info!(
        request_id = %req_id.0,
        pokemon,
        grade = params.grade.as_deref(),
        "card price search"
    );
    let response = state
        .orchestrator
        .search(pokemon, params.grade.as_deref())
        .await;
    tracing::info!(
        request_id = %req_id.0,
        count = response.count,
        source = ?response.source,
        "card price search finished"
    );
    Ok(Json(response))
}
