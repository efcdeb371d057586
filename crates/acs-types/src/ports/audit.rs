//! Audit sink port definition.
//!
//! The audit sink is a fire-and-forget, append-only consumer of decision
//! and mutation events. It is external to the authorization hot path: a
//! slow or failing sink must never block or fail a `Check` or `Evaluate`
//! call, only the events it would have recorded are lost or delayed.

use async_trait::async_trait;

use crate::error::Result;
use crate::ids::TenantId;

/// The category of an audit event, matching the three event sources in the
/// system: authorization decisions, administrative mutations, and detected
/// invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AuditCategory {
    AuthDecision,
    AdminMutation,
    SecurityAnomaly,
}

/// A single append-only audit record.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuditEvent {
    pub tenant_id: TenantId,
    pub when_millis: i64,
    pub actor: String,
    pub category: AuditCategory,
    pub entity_type: String,
    pub entity_id: String,
    pub details: String,
}

impl AuditEvent {
    pub fn new(
        tenant_id: TenantId,
        when_millis: i64,
        actor: impl Into<String>,
        category: AuditCategory,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            when_millis,
            actor: actor.into(),
            category,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            details: details.into(),
        }
    }
}

/// Fire-and-forget, append-only audit consumer.
///
/// Implementations must preserve FIFO order of events within a single
/// tenant; ordering across tenants is unspecified.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records a single event.
    async fn record(&self, event: AuditEvent) -> Result<()>;

    /// Records a batch of events; implementations may use this to reduce
    /// per-call overhead, but must still preserve per-tenant FIFO order as
    /// if each event had been recorded individually in sequence.
    async fn record_batch(&self, events: Vec<AuditEvent>) -> Result<()> {
        for event in events {
            self.record(event).await?;
        }
        Ok(())
    }
}
