use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use om_core::error::{OrgError, OrgmapError};
use om_core::types::{
    CreateOrgInput, DeleteOrgOpts, Org, OrgDetail, OrgFilter, OrgId, UpdateOrgInput,
};
use om_events::types::EventSource;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct FullcodeQuery {
    pub fullcode: String,
}

#[derive(Debug, serde::Deserialize, Default, ToSchema, IntoParams)]
pub struct DeleteOrgQuery {
    #[serde(default)]
    pub dissociate_users: bool,
    #[serde(default)]
    pub dissociate_projects: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/orgs", post(create_org).get(list_orgs))
        .route("/orgs/by-fullcode", get(get_by_fullcode))
        .route(
            "/orgs/{id}",
            get(get_org).patch(update_org).delete(delete_org),
        )
        .route("/orgs/{id}/ancestors", get(ancestors))
        .route("/orgs/{id}/descendants", get(descendants))
        .with_state(state)
}

fn parse_org_id(value: String) -> Result<OrgId, OrgmapError> {
    OrgId::new(value).map_err(|err| {
        OrgmapError::Org(OrgError::InvalidInput {
            message: err.to_string(),
        })
    })
}

#[utoipa::path(
    post,
    path = "/api/orgs",
    request_body = CreateOrgInput,
    responses((status = 200, body = Org))
)]
pub(crate) async fn create_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateOrgInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.orgs().create(&ctx, input) {
        Ok(org) => Json(org).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orgs",
    params(OrgFilter),
    responses((status = 200, body = Vec<Org>))
)]
pub(crate) async fn list_orgs(
    State(state): State<AppState>,
    Query(filter): Query<OrgFilter>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.orgs().list(&filter) {
        Ok(orgs) => Json(orgs).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orgs/{id}",
    params(("id" = String, Path, description = "Org ID")),
    responses((status = 200, body = OrgDetail))
)]
pub(crate) async fn get_org(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let org_id = match parse_org_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.orgs().detail(&org_id) {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orgs/by-fullcode",
    params(FullcodeQuery),
    responses((status = 200, body = Option<Org>))
)]
pub(crate) async fn get_by_fullcode(
    State(state): State<AppState>,
    Query(query): Query<FullcodeQuery>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.orgs().get_by_fullcode(&query.fullcode) {
        Ok(org) => Json(org).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/orgs/{id}",
    params(("id" = String, Path, description = "Org ID")),
    request_body = UpdateOrgInput,
    responses((status = 200, body = Org))
)]
pub(crate) async fn update_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOrgInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let org_id = match parse_org_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.orgs().update(&ctx, &org_id, input) {
        Ok(org) => Json(org).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/orgs/{id}",
    params(("id" = String, Path, description = "Org ID"), DeleteOrgQuery),
    responses((status = 200))
)]
pub(crate) async fn delete_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Query(query): Query<DeleteOrgQuery>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let org_id = match parse_org_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    let opts = DeleteOrgOpts {
        dissociate_users: query.dissociate_users,
        dissociate_projects: query.dissociate_projects,
    };
    match orgmap.orgs().delete(&ctx, &org_id, opts) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orgs/{id}/ancestors",
    params(("id" = String, Path, description = "Org ID")),
    responses((status = 200, body = Vec<Org>))
)]
pub(crate) async fn ancestors(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let org_id = match parse_org_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let result = orgmap
        .orgs()
        .get(&org_id)
        .and_then(|org| orgmap.orgs().ancestors(&org));
    match result {
        Ok(orgs) => Json(orgs).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orgs/{id}/descendants",
    params(("id" = String, Path, description = "Org ID")),
    responses((status = 200, body = Vec<Org>))
)]
pub(crate) async fn descendants(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let org_id = match parse_org_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let result = orgmap
        .orgs()
        .get(&org_id)
        .and_then(|org| orgmap.orgs().descendants(&org));
    match result {
        Ok(orgs) => Json(orgs).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
