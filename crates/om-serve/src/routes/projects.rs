use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use om_core::error::{OrgmapError, ProjectError};
use om_core::types::{
    CreateProjectInput, OrgId, Project, ProjectId, UpdateProjectInput,
};
use om_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AddProjectOrgInput {
    pub org_id: OrgId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route("/projects/{id}", get(get_project).patch(update_project))
        .route("/projects/{id}/orgs", post(add_project_org))
        .route(
            "/projects/{id}/orgs/{org_id}",
            axum::routing::delete(remove_project_org),
        )
        .with_state(state)
}

fn parse_project_id(value: String) -> Result<ProjectId, OrgmapError> {
    ProjectId::new(value).map_err(|err| {
        OrgmapError::Project(ProjectError::InvalidInput {
            message: err.to_string(),
        })
    })
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectInput,
    responses((status = 200, body = Project))
)]
pub(crate) async fn create_project(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateProjectInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.projects().create(&ctx, input) {
        Ok(project) => Json(project).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses((status = 200, body = Vec<Project>))
)]
pub(crate) async fn list_projects(State(state): State<AppState>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.projects().list() {
        Ok(projects) => Json(projects).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    responses((status = 200, body = Project))
)]
pub(crate) async fn get_project(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let project_id = match parse_project_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.projects().get(&project_id) {
        Ok(project) => Json(project).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project ID")),
    request_body = UpdateProjectInput,
    responses((status = 200, body = Project))
)]
pub(crate) async fn update_project(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProjectInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let project_id = match parse_project_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.projects().update(&ctx, &project_id, input) {
        Ok(project) => Json(project).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/orgs",
    params(("id" = String, Path, description = "Project ID")),
    request_body = AddProjectOrgInput,
    responses((status = 200))
)]
pub(crate) async fn add_project_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<AddProjectOrgInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let project_id = match parse_project_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.projects().add_org(&ctx, &project_id, &input.org_id) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}/orgs/{org_id}",
    params(
        ("id" = String, Path, description = "Project ID"),
        ("org_id" = String, Path, description = "Org ID")
    ),
    responses((status = 200))
)]
pub(crate) async fn remove_project_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path((id, org_id)): Path<(String, String)>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let project_id = match parse_project_id(id) {
        Ok(value) => value,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let org_id = match OrgId::new(org_id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &OrgmapError::Project(ProjectError::InvalidInput {
                    message: err.to_string(),
                }),
                Some(correlation.0),
            )
            .into_response();
        }
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap
        .projects()
        .remove_org(&ctx, &project_id, &org_id)
    {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
