use crate::types::directory::DirectoryMapping;
use crate::types::ids::{DirectoryId, LevelId, OrgId, ProjectId, UserId};
use crate::types::level::OrgLevel;
use crate::types::org::Org;
use crate::types::project::Project;
use crate::types::user::UserProfile;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    LevelCreated {
        level: OrgLevel,
    },
    LevelInserted {
        level: OrgLevel,
        placeholders: Vec<OrgId>,
    },
    LevelRemoved {
        level_id: LevelId,
        removed_orgs: Vec<OrgId>,
    },

    OrgCreated {
        org: Org,
    },
    OrgUpdated {
        org: Org,
    },
    OrgDeleted {
        org_id: OrgId,
    },

    DirectoryMapped {
        mapping: DirectoryMapping,
    },
    DirectoryUnmapped {
        mapping_id: DirectoryId,
    },

    UserCreated {
        user: UserProfile,
    },
    UserUpdated {
        user: UserProfile,
    },
    UserOrgAdded {
        user_id: UserId,
        org_id: OrgId,
    },
    UserOrgRemoved {
        user_id: UserId,
        org_id: OrgId,
    },
    UserOrgsSynced {
        user_id: UserId,
        added: Vec<OrgId>,
        removed: Vec<OrgId>,
    },

    ProjectCreated {
        project: Project,
    },
    ProjectUpdated {
        project: Project,
    },
    ProjectOrgAdded {
        project_id: ProjectId,
        org_id: OrgId,
    },
    ProjectOrgRemoved {
        project_id: ProjectId,
        org_id: OrgId,
    },
}
