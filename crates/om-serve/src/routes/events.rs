use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use om_events::types::EventRecord;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, Default, ToSchema, IntoParams)]
pub struct EventsQuery {
    pub after: Option<i64>,
    pub limit: Option<u32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.events().list(query.after, query.limit) {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
