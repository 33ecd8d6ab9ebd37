use crate::util::{from_rfc3339, to_rfc3339};
use om_core::error::UserError;
use om_core::types::{CreateUserInput, OrgId, UpdateUserInput, UserId, UserProfile};
use om_core::users::UserRepository;
use rusqlite::Connection;

pub struct UserRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> UserRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const COLUMNS: &str = "id, username, first_name, last_name, email, is_pi, is_active, primary_org_id, created_at, updated_at";

impl<'a> UserRepository for UserRepo<'a> {
    fn create(&self, input: CreateUserInput) -> Result<UserProfile, UserError> {
        let now = chrono::Utc::now();
        let user = UserProfile {
            id: UserId::generate(),
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            is_pi: input.is_pi.unwrap_or(false),
            is_active: input.is_active.unwrap_or(true),
            primary_org_id: input.primary_org_id,
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO users (id, username, first_name, last_name, email, is_pi, is_active, primary_org_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let params = (
            user.id.as_str(),
            user.username.clone(),
            user.first_name.clone(),
            user.last_name.clone(),
            user.email.clone(),
            user.is_pi,
            user.is_active,
            user.primary_org_id.as_ref().map(OrgId::as_str),
            to_rfc3339(&user.created_at),
            to_rfc3339(&user.updated_at),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(user)
    }

    fn get(&self, id: &UserId) -> Result<Option<UserProfile>, UserError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()])
    }

    fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>, UserError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE username = ?1");
        query_one(self.conn, &sql, [username])
    }

    fn list(&self, active_only: bool) -> Result<Vec<UserProfile>, UserError> {
        let sql = if active_only {
            format!("SELECT {COLUMNS} FROM users WHERE is_active = 1 ORDER BY username ASC")
        } else {
            format!("SELECT {COLUMNS} FROM users ORDER BY username ASC")
        };
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt.query([]).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })? {
            users.push(map_user_row(row)?);
        }
        Ok(users)
    }

    fn update(&self, id: &UserId, input: UpdateUserInput) -> Result<UserProfile, UserError> {
        let mut user = self.get(id)?.ok_or(UserError::NotFound)?;
        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(is_pi) = input.is_pi {
            user.is_pi = is_pi;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }
        user.updated_at = chrono::Utc::now();

        let sql = "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3, is_pi = ?4, is_active = ?5, updated_at = ?6 WHERE id = ?7";
        let params = (
            user.first_name.clone(),
            user.last_name.clone(),
            user.email.clone(),
            user.is_pi,
            user.is_active,
            to_rfc3339(&user.updated_at),
            user.id.as_str(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;

        Ok(user)
    }

    fn set_primary_org(&self, id: &UserId, org_id: Option<&OrgId>) -> Result<(), UserError> {
        let sql = "UPDATE users SET primary_org_id = ?1, updated_at = ?2 WHERE id = ?3";
        let params = (
            org_id.map(OrgId::as_str),
            to_rfc3339(&chrono::Utc::now()),
            id.as_str(),
        );
        let affected = self
            .conn
            .execute(sql, params)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        if affected == 0 {
            return Err(UserError::NotFound);
        }
        Ok(())
    }

    fn add_org(&self, id: &UserId, org_id: &OrgId) -> Result<(), UserError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO user_orgs (user_id, org_id) VALUES (?1, ?2)",
                (id.as_str(), org_id.as_str()),
            )
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }

    fn remove_org(&self, id: &UserId, org_id: &OrgId) -> Result<(), UserError> {
        self.conn
            .execute(
                "DELETE FROM user_orgs WHERE user_id = ?1 AND org_id = ?2",
                (id.as_str(), org_id.as_str()),
            )
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }

    fn org_ids(&self, id: &UserId) -> Result<Vec<OrgId>, UserError> {
        let mut stmt = self
            .conn
            .prepare("SELECT org_id FROM user_orgs WHERE user_id = ?1 ORDER BY org_id ASC")
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let rows = stmt
            .query_map([id.as_str()], |row| row.get::<_, String>(0))
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut ids = Vec::new();
        for row in rows {
            let value = row.map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
            ids.push(OrgId::new(value).map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?);
        }
        Ok(ids)
    }

    fn list_by_org(&self, org_id: &OrgId) -> Result<Vec<UserProfile>, UserError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users WHERE primary_org_id = ?1 OR id IN (SELECT user_id FROM user_orgs WHERE org_id = ?1) ORDER BY username ASC"
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut rows = stmt
            .query([org_id.as_str()])
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })? {
            users.push(map_user_row(row)?);
        }
        Ok(users)
    }

    fn count_org_refs(&self, org_id: &OrgId) -> Result<u32, UserError> {
        let count: u32 = self
            .conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM user_orgs WHERE org_id = ?1) + (SELECT COUNT(*) FROM users WHERE primary_org_id = ?1)",
                [org_id.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(count)
    }

    fn dissociate_org(&self, org_id: &OrgId) -> Result<(), UserError> {
        self.conn
            .execute(
                "DELETE FROM user_orgs WHERE org_id = ?1",
                [org_id.as_str()],
            )
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        self.conn
            .execute(
                "UPDATE users SET primary_org_id = NULL WHERE primary_org_id = ?1",
                [org_id.as_str()],
            )
            .map_err(|err| UserError::InvalidInput {
                message: err.to_string(),
            })?;
        Ok(())
    }
}

fn query_one<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<UserProfile>, UserError> {
    let mut stmt = conn.prepare(sql).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let mut rows = stmt.query(params).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let Some(row) = rows.next().map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?
    else {
        return Ok(None);
    };
    map_user_row(row).map(Some)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> Result<UserProfile, UserError> {
    let id: String = row.get(0).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let username: String = row.get(1).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let first_name: String = row.get(2).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let last_name: String = row.get(3).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let email: String = row.get(4).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_pi: bool = row.get(5).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let is_active: bool = row.get(6).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let primary_org_id: Option<String> = row.get(7).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let created_at: String = row.get(8).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;
    let updated_at: String = row.get(9).map_err(|err| UserError::InvalidInput {
        message: err.to_string(),
    })?;

    let primary_org_id = match primary_org_id {
        Some(value) => Some(OrgId::new(value).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?),
        None => None,
    };

    Ok(UserProfile {
        id: UserId::new(id).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?,
        username,
        first_name,
        last_name,
        email,
        is_pi,
        is_active,
        primary_org_id,
        created_at: from_rfc3339(&created_at).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?,
        updated_at: from_rfc3339(&updated_at).map_err(|err| UserError::InvalidInput {
            message: err.to_string(),
        })?,
    })
}
