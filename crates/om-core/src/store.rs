use crate::directory::DirectoryRepository;
use crate::events::EventRepository;
use crate::levels::LevelRepository;
use crate::orgs::OrgRepository;
use crate::projects::ProjectRepository;
use crate::users::UserRepository;
use crate::OrgmapError;

pub trait Store {
    type Levels<'a>: LevelRepository
    where
        Self: 'a;
    type Orgs<'a>: OrgRepository
    where
        Self: 'a;
    type Directory<'a>: DirectoryRepository
    where
        Self: 'a;
    type Users<'a>: UserRepository
    where
        Self: 'a;
    type Projects<'a>: ProjectRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn levels(&self) -> Self::Levels<'_>;
    fn orgs(&self) -> Self::Orgs<'_>;
    fn directory(&self) -> Self::Directory<'_>;
    fn users(&self) -> Self::Users<'_>;
    fn projects(&self) -> Self::Projects<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, OrgmapError>
    where
        F: FnOnce(&Self) -> Result<T, OrgmapError>;
}
