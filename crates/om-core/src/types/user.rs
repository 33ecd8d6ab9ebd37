use crate::types::ids::{OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_pi: bool,
    pub is_active: bool,
    pub primary_org_id: Option<OrgId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
