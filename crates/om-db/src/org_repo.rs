use crate::util::{from_rfc3339, to_rfc3339};
use om_core::error::OrgError;
use om_core::orgs::OrgRepository;
use om_core::types::{LevelId, NewOrg, Org, OrgFilter, OrgId, UpdateOrgInput};
use rusqlite::Connection;

pub struct OrgRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> OrgRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_child_by(&self, parent_id: Option<&OrgId>, column: &str, value: &str) -> Result<Option<Org>, OrgError> {
        let sql = match parent_id {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM orgs WHERE parent_id = ?1 AND {column} = ?2"
            ),
            None => format!(
                "SELECT {COLUMNS} FROM orgs WHERE parent_id IS NULL AND {column} = ?1"
            ),
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = match parent_id {
            Some(parent_id) => stmt.query((parent_id.as_str(), value)),
            None => stmt.query([value]),
        }
        .map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?;
        let Some(row) = rows.next().map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_org_row(row).map(Some)
    }
}

const COLUMNS: &str = "id, parent_id, level_id, code, shortname, longname, is_selectable_for_user, is_selectable_for_project, created_at, updated_at";

impl<'a> OrgRepository for OrgRepo<'a> {
    fn insert(&self, input: NewOrg) -> Result<Org, OrgError> {
        let now = chrono::Utc::now();
        let org = Org {
            id: OrgId::generate(),
            parent_id: input.parent_id,
            level_id: input.level_id,
            code: input.code,
            shortname: input.shortname,
            longname: input.longname,
            is_selectable_for_user: input.is_selectable_for_user,
            is_selectable_for_project: input.is_selectable_for_project,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO orgs (id, parent_id, level_id, code, shortname, longname, is_selectable_for_user, is_selectable_for_project, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let params = (
            org.id.as_str(),
            org.parent_id.as_ref().map(OrgId::as_str),
            org.level_id.as_str(),
            org.code.clone(),
            org.shortname.clone(),
            org.longname.clone(),
            org.is_selectable_for_user,
            org.is_selectable_for_project,
            to_rfc3339(&org.created_at),
            to_rfc3339(&org.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(org)
    }

    fn get(&self, id: &OrgId) -> Result<Option<Org>, OrgError> {
        let sql = format!("SELECT {COLUMNS} FROM orgs WHERE id = ?1");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([id.as_str()])
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let Some(row) = rows.next().map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?
        else {
            return Ok(None);
        };
        map_org_row(row).map(Some)
    }

    fn list(&self, filter: &OrgFilter) -> Result<Vec<Org>, OrgError> {
        let sql = format!("SELECT {COLUMNS} FROM orgs ORDER BY code ASC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })? {
            orgs.push(map_org_row(row)?);
        }
        Ok(filter_orgs(orgs, filter))
    }

    fn list_children(&self, parent_id: Option<&OrgId>) -> Result<Vec<Org>, OrgError> {
        let sql = match parent_id {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM orgs WHERE parent_id = ?1 ORDER BY code ASC"
            ),
            None => format!(
                "SELECT {COLUMNS} FROM orgs WHERE parent_id IS NULL ORDER BY code ASC"
            ),
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = match parent_id {
            Some(parent_id) => stmt.query([parent_id.as_str()]),
            None => stmt.query([]),
        }
        .map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })? {
            orgs.push(map_org_row(row)?);
        }
        Ok(orgs)
    }

    fn list_by_level(&self, level_id: &LevelId) -> Result<Vec<Org>, OrgError> {
        let sql = format!("SELECT {COLUMNS} FROM orgs WHERE level_id = ?1 ORDER BY code ASC");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([level_id.as_str()])
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })? {
            orgs.push(map_org_row(row)?);
        }
        Ok(orgs)
    }

    fn get_child_by_code(
        &self,
        parent_id: Option<&OrgId>,
        code: &str,
    ) -> Result<Option<Org>, OrgError> {
        self.get_child_by(parent_id, "code", code)
    }

    fn get_child_by_shortname(
        &self,
        parent_id: Option<&OrgId>,
        shortname: &str,
    ) -> Result<Option<Org>, OrgError> {
        self.get_child_by(parent_id, "shortname", shortname)
    }

    fn get_child_by_longname(
        &self,
        parent_id: Option<&OrgId>,
        longname: &str,
    ) -> Result<Option<Org>, OrgError> {
        self.get_child_by(parent_id, "longname", longname)
    }

    fn update(&self, id: &OrgId, input: UpdateOrgInput) -> Result<Org, OrgError> {
        let mut org = self.get(id)?.ok_or(OrgError::NotFound)?;
        if let Some(code) = input.code {
            org.code = code;
        }
        if let Some(shortname) = input.shortname {
            org.shortname = shortname;
        }
        if let Some(longname) = input.longname {
            org.longname = longname;
        }
        if let Some(value) = input.is_selectable_for_user {
            org.is_selectable_for_user = value;
        }
        if let Some(value) = input.is_selectable_for_project {
            org.is_selectable_for_project = value;
        }
        org.updated_at = chrono::Utc::now();

        let sql = "UPDATE orgs SET code = ?1, shortname = ?2, longname = ?3, is_selectable_for_user = ?4, is_selectable_for_project = ?5, updated_at = ?6 WHERE id = ?7";
        let params = (
            org.code.clone(),
            org.shortname.clone(),
            org.longname.clone(),
            org.is_selectable_for_user,
            org.is_selectable_for_project,
            to_rfc3339(&org.updated_at),
            org.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(org)
    }

    fn set_parent(&self, id: &OrgId, parent_id: Option<&OrgId>) -> Result<(), OrgError> {
        let sql = "UPDATE orgs SET parent_id = ?1, updated_at = ?2 WHERE id = ?3";
        let params = (
            parent_id.map(OrgId::as_str),
            to_rfc3339(&chrono::Utc::now()),
            id.as_str(),
        );
        let affected = self
            .conn
            .execute(sql, params)
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(OrgError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: &OrgId) -> Result<(), OrgError> {
        let affected = self
            .conn
            .execute("DELETE FROM orgs WHERE id = ?1", [id.as_str()])
            .map_err(|err| OrgError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(OrgError::NotFound);
        }
        Ok(())
    }
}

fn filter_orgs(orgs: Vec<Org>, filter: &OrgFilter) -> Vec<Org> {
    orgs.into_iter()
        .filter(|org| match &filter.level_id {
            Some(level_id) => org.level_id == *level_id,
            None => true,
        })
        .filter(|org| match &filter.parent_id {
            Some(Some(parent)) => org.parent_id.as_ref() == Some(parent),
            Some(None) => org.parent_id.is_none(),
            None => true,
        })
        .filter(|org| match filter.selectable_for_user {
            Some(value) => org.is_selectable_for_user == value,
            None => true,
        })
        .filter(|org| match filter.selectable_for_project {
            Some(value) => org.is_selectable_for_project == value,
            None => true,
        })
        .collect()
}

fn map_org_row(row: &rusqlite::Row<'_>) -> Result<Org, OrgError> {
    let id: String = row.get(0).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let parent_id: Option<String> = row.get(1).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let level_id: String = row.get(2).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let code: String = row.get(3).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let shortname: String = row.get(4).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let longname: String = row.get(5).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_selectable_for_user: bool = row.get(6).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_selectable_for_project: bool = row.get(7).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(8).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(9).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;

    let id = OrgId::new(id).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;
    let parent_id = match parent_id {
        Some(value) => Some(OrgId::new(value).map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?),
        None => None,
    };
    let level_id = LevelId::new(level_id).map_err(|err| OrgError::InvalidInput {
        message: err.to_string(),
    })?;

    Ok(Org {
        id,
        parent_id,
        level_id,
        code,
        shortname,
        longname,
        is_selectable_for_user,
        is_selectable_for_project,
        created_at: from_rfc3339(&created_at).map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| OrgError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
