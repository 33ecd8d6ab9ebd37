use om_core::error::{LevelError, OrgmapError};
use om_core::store::Store;
use rusqlite::Connection;

use crate::directory_repo::DirectoryRepo;
use crate::event_repo::EventRepo;
use crate::level_repo::LevelRepo;
use crate::org_repo::OrgRepo;
use crate::project_repo::ProjectRepo;
use crate::user_repo::UserRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Levels<'a>
        = LevelRepo<'a>
    where
        Self: 'a;
    type Orgs<'a>
        = OrgRepo<'a>
    where
        Self: 'a;
    type Directory<'a>
        = DirectoryRepo<'a>
    where
        Self: 'a;
    type Users<'a>
        = UserRepo<'a>
    where
        Self: 'a;
    type Projects<'a>
        = ProjectRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn levels(&self) -> Self::Levels<'_> {
        LevelRepo::new(&self.conn)
    }

    fn orgs(&self) -> Self::Orgs<'_> {
        OrgRepo::new(&self.conn)
    }

    fn directory(&self) -> Self::Directory<'_> {
        DirectoryRepo::new(&self.conn)
    }

    fn users(&self) -> Self::Users<'_> {
        UserRepo::new(&self.conn)
    }

    fn projects(&self) -> Self::Projects<'_> {
        ProjectRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, OrgmapError>
    where
        F: FnOnce(&Self) -> Result<T, OrgmapError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(|err| {
            OrgmapError::Level(LevelError::InvalidInput {
                message: err.to_string(),
            })
        })?;
        let result = f(self);
        match result {
            Ok(value) => {
                self.conn.execute_batch("COMMIT").map_err(|err| {
                    OrgmapError::Level(LevelError::InvalidInput {
                        message: err.to_string(),
                    })
                })?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(|rollback_err| {
                        OrgmapError::Level(LevelError::InvalidInput {
                            message: rollback_err.to_string(),
                        })
                    })?;
                Err(err)
            }
        }
    }
}
