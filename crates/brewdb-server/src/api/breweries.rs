//! Brewery catalog endpoints: paginated listing, single lookup,
//! autocomplete, and manual refresh.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use brewdb_catalog::{BreweryDto, QuerySpec, ResultPage, SortKey};
use brewdb_core::AppConfig;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub search_term: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort_by: Option<String>,
    pub ascending: Option<bool>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AutocompleteQuery {
    pub term: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshAccepted {
    pub started: bool,
}

pub(super) async fn list_breweries(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<ResultPage<BreweryDto>>>, ApiError> {
    let spec = build_query_spec(params, &state.config);
    spec.validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let snapshot = state.store.current();
    let page = brewdb_catalog::query(&spec, &snapshot);

    Ok(Json(ApiResponse {
        data: page,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_brewery(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BreweryDto>>, ApiError> {
    let snapshot = state.store.current();
    let Some(dto) = brewdb_catalog::get_by_id(&id, &snapshot) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("Brewery with ID {id} not found"),
        ));
    };

    Ok(Json(ApiResponse {
        data: dto,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn autocomplete(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AutocompleteQuery>,
) -> Json<ApiResponse<Vec<brewdb_catalog::Suggestion>>> {
    let limit = params
        .limit
        .unwrap_or(state.config.autocomplete_default_limit)
        .clamp(1, state.config.autocomplete_max_limit);

    let snapshot = state.store.current();
    let suggestions =
        brewdb_catalog::autocomplete(params.term.as_deref().unwrap_or(""), limit, &snapshot);

    Json(ApiResponse {
        data: suggestions,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let started = state.refresher.trigger_refresh();

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RefreshAccepted { started },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

/// Fills defaults from config and resolves the sort key.
fn build_query_spec(params: ListQuery, config: &AppConfig) -> QuerySpec {
    let default_key = SortKey::parse(&config.default_sort_by).unwrap_or(SortKey::Name);
    let default_ascending = config.default_sort_ascending;

    let (sort_by, ascending) = match params.sort_by.as_deref() {
        Some(raw) => match SortKey::parse(raw) {
            Some(key) => (key, params.ascending.unwrap_or(default_ascending)),
            // An unknown sort key forces the name-ascending fallback in
            // full, direction included.
            None => (SortKey::Name, true),
        },
        None => (default_key, params.ascending.unwrap_or(default_ascending)),
    };

    QuerySpec {
        search_term: params.search_term,
        city: params.city,
        state: params.state,
        sort_by,
        ascending,
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(config.default_page_size),
        user_latitude: params.user_latitude,
        user_longitude: params.user_longitude,
    }
}
