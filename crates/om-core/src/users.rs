use crate::error::UserError;
use crate::types::{CreateUserInput, OrgId, UpdateUserInput, UserId, UserProfile};

pub trait UserRepository {
    fn create(&self, input: CreateUserInput) -> Result<UserProfile, UserError>;
    fn get(&self, id: &UserId) -> Result<Option<UserProfile>, UserError>;
    fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>, UserError>;
    fn list(&self, active_only: bool) -> Result<Vec<UserProfile>, UserError>;
    fn update(&self, id: &UserId, input: UpdateUserInput) -> Result<UserProfile, UserError>;
    fn set_primary_org(&self, id: &UserId, org_id: Option<&OrgId>) -> Result<(), UserError>;
    fn add_org(&self, id: &UserId, org_id: &OrgId) -> Result<(), UserError>;
    fn remove_org(&self, id: &UserId, org_id: &OrgId) -> Result<(), UserError>;
    /// Additional (non-primary) memberships.
    fn org_ids(&self, id: &UserId) -> Result<Vec<OrgId>, UserError>;
    /// Users whose primary or additional memberships include the org.
    fn list_by_org(&self, org_id: &OrgId) -> Result<Vec<UserProfile>, UserError>;
    fn count_org_refs(&self, org_id: &OrgId) -> Result<u32, UserError>;
    fn dissociate_org(&self, org_id: &OrgId) -> Result<(), UserError>;
}
