use crate::common::{EventEnvelope, EventJournal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// In-memory journal, in append order. With a capacity set, the oldest
/// events are dropped once it is full.
#[derive(Debug, Default)]
pub struct InMemoryEventJournal {
    events: RwLock<VecDeque<EventEnvelope>>,
    capacity: Option<usize>,
}

impl InMemoryEventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: Some(capacity.max(1)),
        }
    }
}

#[async_trait]
impl EventJournal for InMemoryEventJournal {
    async fn append(&self, envelope: EventEnvelope) -> Result<(), String> {
        let mut events = self.events.write().await;
        if let Some(last) = events.back() {
            if envelope.sequence <= last.sequence {
                return Err(format!(
                    "Sequence out of order: {} after {}",
                    envelope.sequence, last.sequence
                ));
            }
        }
        if let Some(capacity) = self.capacity {
            while events.len() >= capacity {
                events.pop_front();
            }
        }
        events.push_back(envelope);
        Ok(())
    }

    async fn load_for(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope>, String> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect())
    }

    async fn load_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        let events = self.events.read().await;
        let mut filtered: Vec<EventEnvelope> = events
            .iter()
            .filter(|e| e.event_type == event_type)
            .filter(|e| from_timestamp.map_or(true, |from| e.occurred_at >= from))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(filtered)
    }

    async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}
