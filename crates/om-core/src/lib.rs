pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod levels;
pub mod orgmap;
pub mod orgs;
pub mod projects;
pub mod store;
pub mod users;
pub mod validation;
pub mod xdmod;

pub mod types;

pub use crate::config::OrgmapConfig;
pub use crate::error::OrgmapError;
pub use crate::orgmap::{Orgmap, RequestContext};
pub use crate::store::Store;
