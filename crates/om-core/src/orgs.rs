use crate::error::OrgError;
use crate::types::{LevelId, NewOrg, Org, OrgFilter, OrgId, UpdateOrgInput};

pub trait OrgRepository {
    fn insert(&self, input: NewOrg) -> Result<Org, OrgError>;
    fn get(&self, id: &OrgId) -> Result<Option<Org>, OrgError>;
    fn list(&self, filter: &OrgFilter) -> Result<Vec<Org>, OrgError>;
    /// Direct children; `None` lists the parentless roots.
    fn list_children(&self, parent_id: Option<&OrgId>) -> Result<Vec<Org>, OrgError>;
    fn list_by_level(&self, level_id: &LevelId) -> Result<Vec<Org>, OrgError>;
    fn get_child_by_code(
        &self,
        parent_id: Option<&OrgId>,
        code: &str,
    ) -> Result<Option<Org>, OrgError>;
    fn get_child_by_shortname(
        &self,
        parent_id: Option<&OrgId>,
        shortname: &str,
    ) -> Result<Option<Org>, OrgError>;
    fn get_child_by_longname(
        &self,
        parent_id: Option<&OrgId>,
        longname: &str,
    ) -> Result<Option<Org>, OrgError>;
    fn update(&self, id: &OrgId, input: UpdateOrgInput) -> Result<Org, OrgError>;
    fn set_parent(&self, id: &OrgId, parent_id: Option<&OrgId>) -> Result<(), OrgError>;
    fn delete(&self, id: &OrgId) -> Result<(), OrgError>;
}
