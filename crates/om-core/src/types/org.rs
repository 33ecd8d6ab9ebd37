use crate::types::ids::{LevelId, OrgId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An organizational unit at some tier of the hierarchy.
///
/// `code` is the short per-sibling-unique handle; joining codes from the
/// root ancestor down with `-` yields the fullcode, which is why a code
/// itself may not contain a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Org {
    pub id: OrgId,
    pub parent_id: Option<OrgId>,
    pub level_id: LevelId,
    pub code: String,
    pub shortname: String,
    pub longname: String,
    pub is_selectable_for_user: bool,
    pub is_selectable_for_project: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An organization together with its computed fullcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgDetail {
    pub org: Org,
    pub fullcode: String,
}
