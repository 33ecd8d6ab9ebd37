use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_orgmap, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use om_core::error::{OrgError, OrgmapError};
use om_core::types::{CreateUserInput, OrgId, SyncOpts, SyncOutcome, UpdateUserInput, UserProfile};
use om_events::types::EventSource;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, Default, ToSchema, IntoParams)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AddUserOrgInput {
    pub org_id: OrgId,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct SyncUserInput {
    pub dirstrings: Vec<String>,
    #[serde(default)]
    pub add_parents: bool,
    #[serde(default)]
    pub create_placeholder: bool,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub dry_run: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{username}", get(get_user).patch(update_user))
        .route("/users/{username}/orgs", post(add_user_org).get(user_orgs))
        .route(
            "/users/{username}/orgs/{org_id}",
            axum::routing::delete(remove_user_org),
        )
        .route("/users/{username}/sync", post(sync_user))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserInput,
    responses((status = 200, body = UserProfile))
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateUserInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match orgmap.users().create(&ctx, input) {
        Ok(user) => Json(user).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses((status = 200, body = Vec<UserProfile>))
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.users().list(query.active_only) {
        Ok(users) => Json(users).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses((status = 200, body = UserProfile))
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match orgmap.users().get_by_username(&username) {
        Ok(user) => Json(user).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UpdateUserInput,
    responses((status = 200, body = UserProfile))
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    let result = orgmap
        .users()
        .get_by_username(&username)
        .and_then(|user| orgmap.users().update(&ctx, &user.id, input));
    match result {
        Ok(user) => Json(user).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/orgs",
    params(("username" = String, Path, description = "Username")),
    responses((status = 200, body = Vec<om_core::types::Org>))
)]
pub(crate) async fn user_orgs(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let result = orgmap
        .users()
        .get_by_username(&username)
        .and_then(|user| orgmap.users().orgs(&user));
    match result {
        Ok(orgs) => Json(orgs).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{username}/orgs",
    params(("username" = String, Path, description = "Username")),
    request_body = AddUserOrgInput,
    responses((status = 200))
)]
pub(crate) async fn add_user_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(username): Path<String>,
    Json(input): Json<AddUserOrgInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    let result = orgmap
        .users()
        .get_by_username(&username)
        .and_then(|user| orgmap.users().add_org(&ctx, &user.id, &input.org_id));
    match result {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{username}/orgs/{org_id}",
    params(
        ("username" = String, Path, description = "Username"),
        ("org_id" = String, Path, description = "Org ID")
    ),
    responses((status = 200))
)]
pub(crate) async fn remove_user_org(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path((username, org_id)): Path<(String, String)>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let org_id = match OrgId::new(org_id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &OrgmapError::Org(OrgError::InvalidInput {
                    message: err.to_string(),
                }),
                Some(correlation.0),
            )
            .into_response();
        }
    };
    let ctx = om_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    let result = orgmap
        .users()
        .get_by_username(&username)
        .and_then(|user| orgmap.users().remove_org(&ctx, &user.id, &org_id));
    match result {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{username}/sync",
    params(("username" = String, Path, description = "Username")),
    request_body = SyncUserInput,
    responses((status = 200, body = SyncOutcome))
)]
pub(crate) async fn sync_user(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(username): Path<String>,
    Json(input): Json<SyncUserInput>,
) -> Response {
    let orgmap = match build_orgmap(&state) {
        Ok(orgmap) => orgmap,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = om_core::RequestContext::new(EventSource::Sync, Some(correlation.0));
    let opts = SyncOpts {
        add_parents: input.add_parents,
        create_placeholder: input.create_placeholder,
        delete: input.delete,
        dry_run: input.dry_run,
    };
    match orgmap
        .directory()
        .sync_user_orgs(&ctx, &username, &input.dirstrings, opts)
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
