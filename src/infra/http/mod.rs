mod menu;
mod middleware;

pub use middleware::RequestContext;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;
use crate::application::menu::MenuService;
use crate::infra::db::PostgresRecordSource;

use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct MenuState {
    pub menu: Arc<MenuService>,
    pub db: Option<PostgresRecordSource>,
}

pub fn build_router(state: MenuState) -> Router {
    let api = Router::new()
        .route("/navigation", get(menu::navigation))
        .route("/groups", get(menu::groups))
        .route("/groups/{id}", get(menu::group_sections))
        .route("/navbar", get(menu::navbar))
        .route("/featured", get(menu::featured))
        .route("/search", get(menu::search))
        .route("/clear-cache", post(menu::clear_cache))
        .route("/cache", get(menu::cache_snapshot));

    Router::new()
        .nest("/api/menu", api)
        .route("/_health", get(health))
        .route("/_health/db", get(db_health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn db_health(State(state): State<MenuState>) -> Response {
    match state.db.as_ref() {
        Some(db) => db_health_response(db.health_check().await),
        None => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_message(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                "database url is not configured",
            )
            .attach(&mut response);
            response
        }
    }
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
