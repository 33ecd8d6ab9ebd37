use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use om_core::error::OrgmapError;
use om_core::events::EventRepository;
use om_events::types::EventRecord;
use rusqlite::Connection;
use ulid::Ulid;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> EventRepository for EventRepo<'a> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, OrgmapError> {
        event.seq = next_seq(self.conn)?;
        event.id = format!("evt_{}", Ulid::new());

        let sql = "INSERT INTO events (id, seq, at, correlation_id, source, body_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            event.id.clone(),
            event.seq,
            to_rfc3339(&event.at),
            event.correlation_id.clone(),
            encode_enum(&event.source).map_err(|err| OrgmapError::Internal {
                message: err.to_string(),
            })?,
            event.body.to_string(),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| OrgmapError::Internal {
                message: err.to_string(),
            })?;

        Ok(event)
    }

    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, OrgmapError> {
        let mut sql =
            String::from("SELECT id, seq, at, correlation_id, source, body_json FROM events");
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(after) = after {
            sql.push_str(" WHERE seq > ?");
            params.push(after.into());
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(i64::from(limit).into());
        }

        let mut stmt = self.conn.prepare(&sql).map_err(|err| OrgmapError::Internal {
            message: err.to_string(),
        })?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), map_event_row)
            .map_err(|err| OrgmapError::Internal {
                message: err.to_string(),
            })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(|err| OrgmapError::Internal {
                message: err.to_string(),
            })?);
        }
        Ok(events)
    }
}

fn next_seq(conn: &Connection) -> Result<i64, OrgmapError> {
    conn.query_row("SELECT COALESCE(MAX(seq), 0) + 1 FROM events", [], |row| {
        row.get(0)
    })
    .map_err(|err| OrgmapError::Internal {
        message: err.to_string(),
    })
}

fn map_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRecord> {
    let at: String = row.get(2)?;
    let source: String = row.get(4)?;
    let body: String = row.get(5)?;
    Ok(EventRecord {
        id: row.get(0)?,
        seq: row.get(1)?,
        at: from_rfc3339(&at).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(err))
        })?,
        correlation_id: row.get(3)?,
        source: decode_enum(&source).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
        })?,
        body: serde_json::from_str(&body).unwrap_or_else(|_| serde_json::json!({})),
    })
}
