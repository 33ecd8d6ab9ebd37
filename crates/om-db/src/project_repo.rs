use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use om_core::error::ProjectError;
use om_core::projects::ProjectRepository;
use om_core::types::{
    CreateProjectInput, OrgId, Project, ProjectId, ProjectStatus, UpdateProjectInput,
};
use rusqlite::Connection;

pub struct ProjectRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ProjectRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const COLUMNS: &str = "id, title, status, primary_org_id, created_at, updated_at";

impl<'a> ProjectRepository for ProjectRepo<'a> {
    fn create(&self, input: CreateProjectInput) -> Result<Project, ProjectError> {
        let now = chrono::Utc::now();
        let project = Project {
            id: ProjectId::generate(),
            title: input.title,
            status: input.status.unwrap_or(ProjectStatus::New),
            primary_org_id: input.primary_org_id,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO projects (id, title, status, primary_org_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            project.id.as_str(),
            project.title.clone(),
            encode_enum(&project.status).map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?,
            project.primary_org_id.as_ref().map(OrgId::as_str),
            to_rfc3339(&project.created_at),
            to_rfc3339(&project.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(project)
    }

    fn get(&self, id: &ProjectId) -> Result<Option<Project>, ProjectError> {
        let sql = format!("SELECT {COLUMNS} FROM projects WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()])
    }

    fn get_by_title(&self, title: &str) -> Result<Option<Project>, ProjectError> {
        let sql = format!("SELECT {COLUMNS} FROM projects WHERE title = ?1");
        query_one(self.conn, &sql, [title])
    }

    fn list(&self) -> Result<Vec<Project>, ProjectError> {
        let sql = format!("SELECT {COLUMNS} FROM projects ORDER BY title ASC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })? {
            projects.push(map_project_row(row)?);
        }
        Ok(projects)
    }

    fn update(&self, id: &ProjectId, input: UpdateProjectInput) -> Result<Project, ProjectError> {
        let mut project = self.get(id)?.ok_or(ProjectError::NotFound)?;
        if let Some(title) = input.title {
            project.title = title;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(primary_org_id) = input.primary_org_id {
            project.primary_org_id = primary_org_id;
        }
        project.updated_at = chrono::Utc::now();

        let sql = "UPDATE projects SET title = ?1, status = ?2, primary_org_id = ?3, updated_at = ?4 WHERE id = ?5";
        let params = (
            project.title.clone(),
            encode_enum(&project.status).map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?,
            project.primary_org_id.as_ref().map(OrgId::as_str),
            to_rfc3339(&project.updated_at),
            project.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(project)
    }

    fn add_org(&self, id: &ProjectId, org_id: &OrgId) -> Result<(), ProjectError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO project_orgs (project_id, org_id) VALUES (?1, ?2)",
                (id.as_str(), org_id.as_str()),
            )
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }

    fn remove_org(&self, id: &ProjectId, org_id: &OrgId) -> Result<(), ProjectError> {
        self.conn
            .execute(
                "DELETE FROM project_orgs WHERE project_id = ?1 AND org_id = ?2",
                (id.as_str(), org_id.as_str()),
            )
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }

    fn org_ids(&self, id: &ProjectId) -> Result<Vec<OrgId>, ProjectError> {
        let mut stmt = self
            .conn
            .prepare("SELECT org_id FROM project_orgs WHERE project_id = ?1 ORDER BY org_id ASC")
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        let rows = stmt
            .query_map([id.as_str()], |row| row.get::<_, String>(0))
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut ids = Vec::new();
        for row in rows {
            let value = row.map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
            ids.push(OrgId::new(value).map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?);
        }
        Ok(ids)
    }

    fn list_by_org(
        &self,
        org_id: &OrgId,
        primary_only: bool,
    ) -> Result<Vec<Project>, ProjectError> {
        let sql = if primary_only {
            format!("SELECT {COLUMNS} FROM projects WHERE primary_org_id = ?1 ORDER BY title ASC")
        } else {
            format!(
                "SELECT {COLUMNS} FROM projects WHERE primary_org_id = ?1 OR id IN (SELECT project_id FROM project_orgs WHERE org_id = ?1) ORDER BY title ASC"
            )
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([org_id.as_str()])
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })? {
            projects.push(map_project_row(row)?);
        }
        Ok(projects)
    }

    fn count_org_refs(&self, org_id: &OrgId) -> Result<u32, ProjectError> {
        let count: u32 = self
            .conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM project_orgs WHERE org_id = ?1) + (SELECT COUNT(*) FROM projects WHERE primary_org_id = ?1)",
                [org_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(count)
    }

    fn dissociate_org(&self, org_id: &OrgId) -> Result<(), ProjectError> {
        self.conn
            .execute(
                "DELETE FROM project_orgs WHERE org_id = ?1",
                [org_id.as_str()],
            )
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        self.conn
            .execute(
                "UPDATE projects SET primary_org_id = NULL WHERE primary_org_id = ?1",
                [org_id.as_str()],
            )
            .map_err(|err| ProjectError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }
}

fn query_one<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<Project>, ProjectError> {
    let mut stmt = conn.prepare(sql).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let mut rows = stmt
        .query(params)
        .map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?;
    let Some(row) = rows.next().map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?
    else {
        return Ok(None);
    };
    map_project_row(row).map(Some)
}

fn map_project_row(row: &rusqlite::Row<'_>) -> Result<Project, ProjectError> {
    let id: String = row.get(0).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let title: String = row.get(1).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let status: String = row.get(2).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let primary_org_id: Option<String> = row.get(3).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(4).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(5).map_err(|err| ProjectError::InvalidInput {
        message: err.to_string(),
    })?;

    let primary_org_id = match primary_org_id {
        Some(value) => Some(OrgId::new(value).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?),
        None => None,
    };

    Ok(Project {
        id: ProjectId::new(id).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?,
        title,
        status: decode_enum(&status).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?,
        primary_org_id,
        created_at: from_rfc3339(&created_at).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| ProjectError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
