use crate::error::LevelError;
use crate::types::{LevelId, NewLevel, OrgLevel};

pub trait LevelRepository {
    fn insert(&self, input: NewLevel) -> Result<OrgLevel, LevelError>;
    fn get(&self, id: &LevelId) -> Result<Option<OrgLevel>, LevelError>;
    fn get_by_name(&self, name: &str) -> Result<Option<OrgLevel>, LevelError>;
    /// All levels, root first (descending `level` value).
    fn list(&self) -> Result<Vec<OrgLevel>, LevelError>;
    fn set_parent(&self, id: &LevelId, parent_id: Option<&LevelId>) -> Result<(), LevelError>;
    fn delete(&self, id: &LevelId) -> Result<(), LevelError>;
}
