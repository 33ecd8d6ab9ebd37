use crate::error::DirectoryError;
use crate::types::{DirectoryId, DirectoryMapping, OrgId};

pub trait DirectoryRepository {
    fn insert(
        &self,
        org_id: &OrgId,
        directory_string: &str,
    ) -> Result<DirectoryMapping, DirectoryError>;
    fn get(&self, id: &DirectoryId) -> Result<Option<DirectoryMapping>, DirectoryError>;
    fn get_by_string(&self, value: &str) -> Result<Option<DirectoryMapping>, DirectoryError>;
    fn list(&self) -> Result<Vec<DirectoryMapping>, DirectoryError>;
    fn delete(&self, id: &DirectoryId) -> Result<(), DirectoryError>;
}
