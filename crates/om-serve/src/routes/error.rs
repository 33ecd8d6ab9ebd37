use axum::http::StatusCode;
use axum::Json;
use om_core::error::{
    DirectoryError, LevelError, OrgError, OrgmapError, ProjectError, UserError,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &OrgmapError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        OrgmapError::Level(level) => map_level_error(level),
        OrgmapError::Org(org) => map_org_error(org),
        OrgmapError::Directory(directory) => map_directory_error(directory),
        OrgmapError::User(user) => map_user_error(user),
        OrgmapError::Project(project) => map_project_error(project),
        OrgmapError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_level_error(err: &LevelError) -> (StatusCode, &'static str, String) {
    match err {
        LevelError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        LevelError::NameConflict | LevelError::LevelValueConflict => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        LevelError::BrokenChain { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        LevelError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_org_error(err: &OrgError) -> (StatusCode, &'static str, String) {
    match err {
        OrgError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        OrgError::HasChildren | OrgError::InUse { .. } | OrgError::SiblingConflict { .. } => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        OrgError::InvalidPlacement { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        OrgError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_directory_error(err: &DirectoryError) -> (StatusCode, &'static str, String) {
    match err {
        DirectoryError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DirectoryError::StringConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        DirectoryError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_user_error(err: &UserError) -> (StatusCode, &'static str, String) {
    match err {
        UserError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        UserError::UsernameConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        UserError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_project_error(err: &ProjectError) -> (StatusCode, &'static str, String) {
    match err {
        ProjectError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ProjectError::TitleConflict => (StatusCode::CONFLICT, "conflict", err.to_string()),
        ProjectError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}
