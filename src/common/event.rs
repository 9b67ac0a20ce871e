use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> String;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Journal record wrapping a serialized domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub aggregate_id: String,
    pub event_type: String,
    pub sequence: u64,
    pub event_data: serde_json::Value,
    pub source: String,
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new<E: DomainEvent + Serialize>(
        event: &E,
        sequence: u64,
        source: &str,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            aggregate_id: event.aggregate_id(),
            event_type: event.event_type().to_string(),
            sequence,
            event_data: serde_json::to_value(event)?,
            source: source.to_string(),
            occurred_at: event.occurred_at(),
        })
    }
}

/// Append-only log of simulation events.
#[async_trait::async_trait]
pub trait EventJournal: Send + Sync {
    async fn append(&self, envelope: EventEnvelope) -> Result<(), String>;

    async fn load_for(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, String>;

    async fn load_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String>;

    async fn count(&self) -> usize;
}
