use crate::types::ids::LevelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One tier of the organization hierarchy.
///
/// Tiers form a single chain: the root tier has no parent, and every
/// other tier names the tier immediately above it. A higher `level`
/// value means a more encompassing tier, e.g. an academic deployment
/// might use University 40, College 30, Department 20.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrgLevel {
    pub id: LevelId,
    pub name: String,
    pub level: i64,
    pub parent_id: Option<LevelId>,
    pub export_to_xdmod: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrgLevel {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
