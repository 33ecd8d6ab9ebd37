use crate::error::ProjectError;
use crate::types::{CreateProjectInput, OrgId, Project, ProjectId, UpdateProjectInput};

pub trait ProjectRepository {
    fn create(&self, input: CreateProjectInput) -> Result<Project, ProjectError>;
    fn get(&self, id: &ProjectId) -> Result<Option<Project>, ProjectError>;
    fn get_by_title(&self, title: &str) -> Result<Option<Project>, ProjectError>;
    fn list(&self) -> Result<Vec<Project>, ProjectError>;
    fn update(&self, id: &ProjectId, input: UpdateProjectInput) -> Result<Project, ProjectError>;
    fn add_org(&self, id: &ProjectId, org_id: &OrgId) -> Result<(), ProjectError>;
    fn remove_org(&self, id: &ProjectId, org_id: &OrgId) -> Result<(), ProjectError>;
    /// Additional (non-primary) memberships.
    fn org_ids(&self, id: &ProjectId) -> Result<Vec<OrgId>, ProjectError>;
    fn list_by_org(&self, org_id: &OrgId, primary_only: bool) -> Result<Vec<Project>, ProjectError>;
    fn count_org_refs(&self, org_id: &OrgId) -> Result<u32, ProjectError>;
    fn dissociate_org(&self, org_id: &OrgId) -> Result<(), ProjectError>;
}
