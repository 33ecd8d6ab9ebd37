use crate::types::enums::ProjectStatus;
use crate::types::ids::{LevelId, OrgId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateLevelInput {
    pub name: String,
    pub level: i64,
    pub parent_name: Option<String>,
    pub export_to_xdmod: bool,
}

/// Repo-level level row with the parent already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewLevel {
    pub name: String,
    pub level: i64,
    pub parent_id: Option<LevelId>,
    pub export_to_xdmod: bool,
}

/// Repo-level organization row with all fields resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewOrg {
    pub parent_id: Option<OrgId>,
    pub level_id: LevelId,
    pub code: String,
    pub shortname: String,
    pub longname: String,
    pub is_selectable_for_user: bool,
    pub is_selectable_for_project: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateOrgInput {
    pub parent_id: Option<OrgId>,
    pub level_id: LevelId,
    pub code: String,
    pub shortname: Option<String>,
    pub longname: Option<String>,
    pub is_selectable_for_user: Option<bool>,
    pub is_selectable_for_project: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrgInput {
    pub code: Option<String>,
    pub shortname: Option<String>,
    pub longname: Option<String>,
    pub is_selectable_for_user: Option<bool>,
    pub is_selectable_for_project: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct OrgFilter {
    pub level_id: Option<LevelId>,
    pub parent_id: Option<Option<OrgId>>,
    pub selectable_for_user: Option<bool>,
    pub selectable_for_project: Option<bool>,
}

/// Flags for deleting an organization that still has references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteOrgOpts {
    pub dissociate_users: bool,
    pub dissociate_projects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateUserInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_pi: Option<bool>,
    pub is_active: Option<bool>,
    pub primary_org_id: Option<OrgId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_pi: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectInput {
    pub title: String,
    pub status: Option<ProjectStatus>,
    pub primary_org_id: Option<OrgId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub status: Option<ProjectStatus>,
    pub primary_org_id: Option<Option<OrgId>>,
}

/// Options controlling a directory-string membership sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncOpts {
    pub add_parents: bool,
    pub create_placeholder: bool,
    pub delete: bool,
    pub dry_run: bool,
}

/// Options for matching projects against a set of organizations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectOrgQuery {
    pub match_all: bool,
    pub include_descendants: bool,
    pub statuses: Vec<ProjectStatus>,
    pub primary_only: bool,
}
