use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("organization level not found")]
    NotFound,
    #[error("name already exists")]
    NameConflict,
    #[error("level value already exists")]
    LevelValueConflict,
    #[error("hierarchy violation: {message}")]
    BrokenChain { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum OrgError {
    #[error("organization not found")]
    NotFound,
    #[error("organization has children")]
    HasChildren,
    #[error("organization is referenced: {message}")]
    InUse { message: String },
    #[error("code, shortname or longname already used by a sibling: {message}")]
    SiblingConflict { message: String },
    #[error("invalid placement: {message}")]
    InvalidPlacement { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory mapping not found")]
    NotFound,
    #[error("directory string already mapped")]
    StringConflict,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("username already exists")]
    UsernameConflict,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project not found")]
    NotFound,
    #[error("title already exists")]
    TitleConflict,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum OrgmapError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Org(#[from] OrgError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
