use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::application::{error::HttpError, repos::SourceError};

use super::MenuState;

const SOURCE: &str = "infra::http::menu";

const MENU_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClearCacheRequest {
    #[serde(default)]
    group_id: Option<String>,
}

fn with_cache_headers(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(MENU_CACHE_CONTROL));
    response
}

/// An empty tree is a 404 when the source answered, a 503 when there is no
/// source to ask.
fn empty_menu_error(state: &MenuState, public_message: &'static str) -> HttpError {
    if state.menu.source_configured() {
        HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            public_message,
            "menu source returned no active groups",
        )
    } else {
        HttpError::from(SourceError::Unavailable)
    }
}

pub(super) async fn navigation(State(state): State<MenuState>) -> Result<Response, HttpError> {
    let menu = state.menu.navigation_menu().await;
    if menu.groups.is_empty() {
        return Err(empty_menu_error(&state, "No menu data available"));
    }
    Ok(with_cache_headers(Json(menu).into_response()))
}

pub(super) async fn groups(State(state): State<MenuState>) -> Result<Response, HttpError> {
    let groups = state.menu.groups_fast().await;
    if groups.is_empty() {
        return Err(empty_menu_error(&state, "No menu groups available"));
    }
    Ok(with_cache_headers(
        Json(json!({ "data": groups })).into_response(),
    ))
}

pub(super) async fn group_sections(
    State(state): State<MenuState>,
    Path(group_id): Path<String>,
) -> Response {
    let sections = state.menu.group_sections(&group_id).await;
    with_cache_headers(Json(json!({ "data": sections })).into_response())
}

pub(super) async fn navbar(State(state): State<MenuState>) -> Response {
    let groups = state.menu.navbar_groups().await;
    with_cache_headers(Json(json!({ "data": groups })).into_response())
}

pub(super) async fn featured(State(state): State<MenuState>) -> Response {
    let categories = state.menu.featured_categories().await;
    with_cache_headers(Json(categories).into_response())
}

pub(super) async fn search(
    State(state): State<MenuState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let needle = query.q.unwrap_or_default();
    Json(state.menu.search_categories(&needle).await).into_response()
}

/// Always succeeds. A body that is missing or does not parse clears
/// everything.
pub(super) async fn clear_cache(State(state): State<MenuState>, body: Bytes) -> Response {
    let request: ClearCacheRequest = serde_json::from_slice(&body).unwrap_or_default();
    let group_id = request
        .group_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let message = match group_id {
        Some(group_id) => {
            let outcome = state.menu.invalidate_group(&group_id);
            info!(
                target = SOURCE,
                group_id = %group_id,
                dropped = outcome.dropped.len(),
                "Menu cache cleared for group"
            );
            format!("Cache cleared for group: {group_id}")
        }
        None => {
            let outcome = state.menu.invalidate_all();
            info!(
                target = SOURCE,
                dropped = outcome.dropped.len(),
                "Menu cache cleared"
            );
            "All menu cache cleared".to_string()
        }
    };

    Json(json!({ "message": message })).into_response()
}

pub(super) async fn cache_snapshot(State(state): State<MenuState>) -> Response {
    Json(state.menu.cache_snapshot()).into_response()
}
