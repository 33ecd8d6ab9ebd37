use crate::util::{from_rfc3339, to_rfc3339};
use om_core::directory::DirectoryRepository;
use om_core::error::DirectoryError;
use om_core::types::{DirectoryId, DirectoryMapping, OrgId};
use rusqlite::Connection;

pub struct DirectoryRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> DirectoryRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const COLUMNS: &str = "id, directory_string, org_id, created_at, updated_at";

impl<'a> DirectoryRepository for DirectoryRepo<'a> {
    fn insert(
        &self,
        org_id: &OrgId,
        directory_string: &str,
    ) -> Result<DirectoryMapping, DirectoryError> {
        let now = chrono::Utc::now();
        let mapping = DirectoryMapping {
            id: DirectoryId::generate(),
            directory_string: directory_string.to_string(),
            org_id: org_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO directory_mappings (id, directory_string, org_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)";
        let params = (
            mapping.id.as_str(),
            mapping.directory_string.clone(),
            mapping.org_id.as_str(),
            to_rfc3339(&mapping.created_at),
            to_rfc3339(&mapping.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(mapping)
    }

    fn get(&self, id: &DirectoryId) -> Result<Option<DirectoryMapping>, DirectoryError> {
        let sql = format!("SELECT {COLUMNS} FROM directory_mappings WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_mapping_row(row).map(Some)
    }

    fn get_by_string(&self, value: &str) -> Result<Option<DirectoryMapping>, DirectoryError> {
        let sql = format!("SELECT {COLUMNS} FROM directory_mappings WHERE directory_string = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([value])
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_mapping_row(row).map(Some)
    }

    fn list(&self) -> Result<Vec<DirectoryMapping>, DirectoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM directory_mappings ORDER BY directory_string ASC"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut mappings = Vec::new();
        while let Some(row) = rows.next().map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })? {
            mappings.push(map_mapping_row(row)?);
        }
        Ok(mappings)
    }

    fn delete(&self, id: &DirectoryId) -> Result<(), DirectoryError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM directory_mappings WHERE id = ?1",
                [id.as_str()],
            )
            .map_err(|err| DirectoryError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}

fn map_mapping_row(row: &rusqlite::Row<'_>) -> Result<DirectoryMapping, DirectoryError> {
    let id: String = row.get(0).map_err(|err| DirectoryError::InvalidInput {
        message: err.to_string(),
    })?;
    let directory_string: String = row.get(1).map_err(|err| DirectoryError::InvalidInput {
        message: err.to_string(),
    })?;
    let org_id: String = row.get(2).map_err(|err| DirectoryError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(3).map_err(|err| DirectoryError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(4).map_err(|err| DirectoryError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(DirectoryMapping {
        id: DirectoryId::new(id).map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?,
        directory_string,
        org_id: OrgId::new(org_id).map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?,
        created_at: from_rfc3339(&created_at).map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| DirectoryError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
