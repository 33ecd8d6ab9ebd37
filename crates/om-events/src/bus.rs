use crate::types::EventRecord;
use tokio::sync::broadcast;

/// In-process fan-out of committed event records.
///
/// Mutations append records to the store inside their transaction and
/// publish here after commit, so subscribers never observe rolled-back
/// changes.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: EventRecord,
    ) -> Result<(), broadcast::error::SendError<EventRecord>> {
        self.sender.send(event).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventSource;
    use chrono::Utc;

    #[tokio::test]
    async fn subscriber_receives_published_record() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let record = EventRecord {
            id: "evt_01HZZZZZZZZZZZZZZZZZZZZZZZ".to_string(),
            seq: 1,
            at: Utc::now(),
            correlation_id: None,
            source: EventSource::Cli,
            body: serde_json::json!({"type": "LevelCreated"}),
        };
        bus.publish(record.clone()).unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, record.id);
        assert_eq!(received.seq, 1);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_an_error() {
        let bus = EventBus::new(8);
        let record = EventRecord {
            id: "evt_01HZZZZZZZZZZZZZZZZZZZZZZZ".to_string(),
            seq: 1,
            at: Utc::now(),
            correlation_id: None,
            source: EventSource::Api,
            body: serde_json::json!({}),
        };
        assert!(bus.publish(record).is_err());
    }
}
