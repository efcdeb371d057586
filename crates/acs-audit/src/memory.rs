//! Bounded, ordered in-memory [`AuditSink`], primarily for tests and for
//! operators who want to inspect recent audit activity without standing
//! up an external sink.

use std::sync::Mutex;

use acs_types::error::Result;
use acs_types::ports::audit::{AuditEvent, AuditSink};
use async_trait::async_trait;

/// Retains the most recent `capacity` events per process, oldest first,
/// evicting the earliest entry once full. Ordering within a tenant is
/// preserved because `record` always appends.
pub struct InMemoryAuditSink {
    capacity: usize,
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything retained, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink mutex poisoned").clone()
    }

    /// Snapshot filtered to a single tenant, oldest first.
    pub fn events_for_tenant(&self, tenant_id: &str) -> Vec<AuditEvent> {
        self.events
            .lock()
            .expect("audit sink mutex poisoned")
            .iter()
            .filter(|e| e.tenant_id.as_str() == tenant_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("audit sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().expect("audit sink mutex poisoned").clear();
    }
}

impl Default for InMemoryAuditSink {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        let mut events = self.events.lock().expect("audit sink mutex poisoned");
        if events.len() >= self.capacity {
            events.remove(0);
        }
        events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_types::ids::TenantId;
    use acs_types::ports::audit::AuditCategory;

    fn sample_event(tenant: &str, entity_id: &str) -> AuditEvent {
        AuditEvent::new(
            TenantId::new(tenant),
            0,
            "alice",
            AuditCategory::AdminMutation,
            "user",
            entity_id,
            "{}",
        )
    }

    #[tokio::test]
    async fn records_preserve_insertion_order() {
        let sink = InMemoryAuditSink::new(10);
        sink.record(sample_event("t1", "1")).await.unwrap();
        sink.record(sample_event("t1", "2")).await.unwrap();
        let events = sink.events();
        assert_eq!(events[0].entity_id, "1");
        assert_eq!(events[1].entity_id, "2");
    }

    #[tokio::test]
    async fn evicts_oldest_entry_once_capacity_is_reached() {
        let sink = InMemoryAuditSink::new(2);
        sink.record(sample_event("t1", "1")).await.unwrap();
        sink.record(sample_event("t1", "2")).await.unwrap();
        sink.record(sample_event("t1", "3")).await.unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].entity_id, "2");
        assert_eq!(events[1].entity_id, "3");
    }

    #[tokio::test]
    async fn filters_by_tenant() {
        let sink = InMemoryAuditSink::new(10);
        sink.record(sample_event("t1", "1")).await.unwrap();
        sink.record(sample_event("t2", "2")).await.unwrap();
        assert_eq!(sink.events_for_tenant("t1").len(), 1);
        assert_eq!(sink.events_for_tenant("t2").len(), 1);
        assert_eq!(sink.events_for_tenant("t3").len(), 0);
    }
}
