use crate::error::OrgmapError;
use om_events::types::EventRecord;

pub trait EventRepository {
    fn append(&self, event: EventRecord) -> Result<EventRecord, OrgmapError>;
    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, OrgmapError>;
}
