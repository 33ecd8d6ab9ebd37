use utoipa::OpenApi;

use crate::routes::directory::{ConvertStringsInput, MapDirectoryInput};
use crate::routes::events::EventsQuery;
use crate::routes::orgs::{DeleteOrgQuery, FullcodeQuery};
use crate::routes::projects::AddProjectOrgInput;
use crate::routes::users::{AddUserOrgInput, ListUsersQuery, SyncUserInput};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use om_core::types::directory::{DirectoryMapping, SyncOutcome};
use om_core::types::enums::ProjectStatus;
use om_core::types::ids::{DirectoryId, LevelId, OrgId, ProjectId, UserId};
use om_core::types::io::{
    CreateLevelInput, CreateOrgInput, CreateProjectInput, CreateUserInput, OrgFilter,
    UpdateOrgInput, UpdateProjectInput, UpdateUserInput,
};
use om_core::types::level::OrgLevel;
use om_core::types::org::{Org, OrgDetail};
use om_core::types::project::Project;
use om_core::types::user::UserProfile;
use om_core::xdmod::XdmodHierarchySetup;
use om_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::levels::create_level,
        crate::routes::levels::insert_level,
        crate::routes::levels::list_levels,
        crate::routes::levels::get_level,
        crate::routes::levels::remove_level,
        crate::routes::levels::validate_levels,
        crate::routes::levels::xdmod_setup,
        crate::routes::orgs::create_org,
        crate::routes::orgs::list_orgs,
        crate::routes::orgs::get_org,
        crate::routes::orgs::get_by_fullcode,
        crate::routes::orgs::update_org,
        crate::routes::orgs::delete_org,
        crate::routes::orgs::ancestors,
        crate::routes::orgs::descendants,
        crate::routes::directory::map_directory,
        crate::routes::directory::list_directory,
        crate::routes::directory::convert_strings,
        crate::routes::directory::unmap_directory,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::user_orgs,
        crate::routes::users::add_user_org,
        crate::routes::users::remove_user_org,
        crate::routes::users::sync_user,
        crate::routes::projects::create_project,
        crate::routes::projects::list_projects,
        crate::routes::projects::get_project,
        crate::routes::projects::update_project,
        crate::routes::projects::add_project_org,
        crate::routes::projects::remove_project_org,
        crate::routes::events::list_events
    ),
    components(schemas(
        OrgLevel,
        CreateLevelInput,
        XdmodHierarchySetup,
        Org,
        OrgDetail,
        CreateOrgInput,
        UpdateOrgInput,
        OrgFilter,
        FullcodeQuery,
        DeleteOrgQuery,
        DirectoryMapping,
        MapDirectoryInput,
        ConvertStringsInput,
        SyncOutcome,
        UserProfile,
        CreateUserInput,
        UpdateUserInput,
        ListUsersQuery,
        AddUserOrgInput,
        SyncUserInput,
        Project,
        CreateProjectInput,
        UpdateProjectInput,
        AddProjectOrgInput,
        EventRecord,
        EventsQuery,
        LevelId,
        OrgId,
        DirectoryId,
        UserId,
        ProjectId,
        ProjectStatus,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn ensure_initialized() {
    let _ = ApiDoc::openapi();
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
