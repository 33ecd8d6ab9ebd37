use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use om_core::types::{CreateLevelInput, OrgLevel};
use om_core::xdmod::XdmodHierarchySetup;
use om_events::types::EventSource;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/levels", post(create_level).get(list_levels))
        .route("/levels/insert", post(insert_level))
        .route("/levels/validate", get(validate_levels))
        .route("/levels/xdmod", get(xdmod_setup))
        .route("/levels/{name}", get(get_level).delete(remove_level))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/levels",
    request_body = CreateLevelInput,
    responses((status = 200, body = OrgLevel))
)]
pub(crate) async fn create_level(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateLevelInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.levels().create(&ctx, input) {
        Ok(level) => Json(level).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/levels/insert",
    request_body = CreateLevelInput,
    responses((status = 200, body = OrgLevel))
)]
pub(crate) async fn insert_level(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateLevelInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.levels().insert(&ctx, input) {
        Ok(level) => Json(level).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/levels",
    responses((status = 200, body = Vec<OrgLevel>))
)]
pub(crate) async fn list_levels(State(state): State<AppState>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.levels().list() {
        Ok(levels) => Json(levels).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/levels/{name}",
    params(("name" = String, Path, description = "Level name")),
    responses((status = 200, body = OrgLevel))
)]
pub(crate) async fn get_level(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.levels().get(&name) {
        Ok(level) => Json(level).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/levels/{name}",
    params(("name" = String, Path, description = "Level name")),
    responses((status = 200))
)]
pub(crate) async fn remove_level(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(name): Path<String>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.levels().remove(&ctx, &name) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/levels/validate",
    responses((status = 200))
)]
pub(crate) async fn validate_levels(State(state): State<AppState>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.levels().validate() {
        Ok(()) => Json(serde_json::json!({ "valid": true })).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/levels/xdmod",
    responses((status = 200, body = XdmodHierarchySetup))
)]
pub(crate) async fn xdmod_setup(State(state): State<AppState>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.levels().xdmod_setup() {
        Ok(setup) => Json(setup).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
