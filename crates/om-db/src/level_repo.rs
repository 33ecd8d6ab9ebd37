use crate::util::{from_rfc3339, to_rfc3339};
use om_core::error::LevelError;
use om_core::levels::LevelRepository;
use om_core::types::{LevelId, NewLevel, OrgLevel};
use rusqlite::Connection;

pub struct LevelRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> LevelRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const COLUMNS: &str = "id, name, level, parent_id, export_to_xdmod, created_at, updated_at";

impl<'a> LevelRepository for LevelRepo<'a> {
    fn insert(&self, input: NewLevel) -> Result<OrgLevel, LevelError> {
        let now = chrono::Utc::now();
        let level = OrgLevel {
            id: LevelId::generate(),
            name: input.name,
            level: input.level,
            parent_id: input.parent_id,
            export_to_xdmod: input.export_to_xdmod,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO org_levels (id, name, level, parent_id, export_to_xdmod, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
        let params = (
            level.id.as_str(),
            level.name.clone(),
            level.level,
            level.parent_id.as_ref().map(LevelId::as_str),
            level.export_to_xdmod,
            to_rfc3339(&level.created_at),
            to_rfc3339(&level.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(level)
    }

    fn get(&self, id: &LevelId) -> Result<Option<OrgLevel>, LevelError> {
        let sql = format!("SELECT {COLUMNS} FROM org_levels WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_level_row(row).map(Some)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<OrgLevel>, LevelError> {
        let sql = format!("SELECT {COLUMNS} FROM org_levels WHERE name = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([name])
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_level_row(row).map(Some)
    }

    fn list(&self) -> Result<Vec<OrgLevel>, LevelError> {
        let sql = format!("SELECT {COLUMNS} FROM org_levels ORDER BY level DESC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut levels = Vec::new();
        while let Some(row) = rows.next().map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })? {
            levels.push(map_level_row(row)?);
        }
        Ok(levels)
    }

    fn set_parent(&self, id: &LevelId, parent_id: Option<&LevelId>) -> Result<(), LevelError> {
        let sql = "UPDATE org_levels SET parent_id = ?1, updated_at = ?2 WHERE id = ?3";
        let params = (
            parent_id.map(LevelId::as_str),
            to_rfc3339(&chrono::Utc::now()),
            id.as_str(),
        );
        let affected = self
            .conn
            .execute(sql, params)
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(LevelError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: &LevelId) -> Result<(), LevelError> {
        let affected = self
            .conn
            .execute("DELETE FROM org_levels WHERE id = ?1", [id.as_str()])
            .map_err(|err| LevelError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(LevelError::NotFound);
        }
        Ok(())
    }
}

fn map_level_row(row: &rusqlite::Row<'_>) -> Result<OrgLevel, LevelError> {
    let id: String = row.get(0).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let name: String = row.get(1).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let level: i64 = row.get(2).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let parent_id: Option<String> = row.get(3).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let export_to_xdmod: bool = row.get(4).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(5).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(6).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;

    let id = LevelId::new(id).map_err(|err| LevelError::InvalidInput {
        message: err.to_string(),
    })?;
    let parent_id = match parent_id {
        Some(value) => Some(LevelId::new(value).map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?),
        None => None,
    };

    Ok(OrgLevel {
        id,
        name,
        level,
        parent_id,
        export_to_xdmod,
        created_at: from_rfc3339(&created_at).map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| LevelError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
