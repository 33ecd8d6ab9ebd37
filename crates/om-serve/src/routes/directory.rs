use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use om_core::error::{DirectoryError, OrgmapError};
use om_core::types::{DirectoryId, DirectoryMapping, Org, OrgId};
use om_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct MapDirectoryInput {
    pub org_id: OrgId,
    pub directory_string: String,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct ConvertStringsInput {
    pub strings: Vec<String>,
    #[serde(default)]
    pub create_placeholder: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/directory", post(map_directory).get(list_directory))
        .route("/directory/convert", post(convert_strings))
        .route("/directory/{id}", axum::routing::delete(unmap_directory))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/directory",
    request_body = MapDirectoryInput,
    responses((status = 200, body = DirectoryMapping))
)]
pub(crate) async fn map_directory(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<MapDirectoryInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap
        .directory()
        .map(&ctx, &input.org_id, &input.directory_string)
    {
        Ok(mapping) => Json(mapping).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/directory",
    responses((status = 200, body = Vec<DirectoryMapping>))
)]
pub(crate) async fn list_directory(State(state): State<AppState>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.directory().list() {
        Ok(mappings) => Json(mappings).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/directory/convert",
    request_body = ConvertStringsInput,
    responses((status = 200, body = Vec<Org>))
)]
pub(crate) async fn convert_strings(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<ConvertStringsInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap
        .directory()
        .convert_strings_to_orgs(&ctx, &input.strings, input.create_placeholder)
    {
        Ok(orgs) => Json(orgs).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/directory/{id}",
    params(("id" = String, Path, description = "Mapping ID")),
    responses((status = 200))
)]
pub(crate) async fn unmap_directory(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let mapping_id = match DirectoryId::new(id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &OrgmapError::Directory(DirectoryError::InvalidInput {
                    message: err.to_string(),
                }),
                Some(correlation.0),
            )
            .into_response();
        }
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.directory().unmap(&ctx, &mapping_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
