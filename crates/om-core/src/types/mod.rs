pub mod directory;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod level;
pub mod org;
pub mod project;
pub mod user;

pub use directory::{DirectoryMapping, SyncOutcome};
pub use enums::ProjectStatus;
pub use event::EventBody;
pub use ids::{DirectoryId, IdError, LevelId, OrgId, ProjectId, UserId};
pub use io::{
    CreateLevelInput, CreateOrgInput, CreateProjectInput, CreateUserInput, DeleteOrgOpts,
    NewLevel, NewOrg, OrgFilter, ProjectOrgQuery, SyncOpts, UpdateOrgInput, UpdateProjectInput,
    UpdateUserInput,
};
pub use level::OrgLevel;
pub use org::{Org, OrgDetail};
pub use project::Project;
pub use user::UserProfile;
