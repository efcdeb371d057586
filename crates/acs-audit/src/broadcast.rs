//! Broadcast-backed [`AuditSink`] for in-process subscribers (e.g. the
//! monitor component's anomaly watcher) that want a live stream of audit
//! events without polling a sink.

use acs_types::error::Result;
use acs_types::ports::audit::{AuditEvent, AuditSink};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Tuning knobs for [`BroadcastAuditSink`].
#[derive(Debug, Clone, Copy)]
pub struct BroadcastAuditSinkConfig {
    /// Channel capacity; a subscriber that falls this far behind starts
    /// missing events (`broadcast::error::RecvError::Lagged`) rather than
    /// applying backpressure to `record`.
    pub buffer_size: usize,
}

impl Default for BroadcastAuditSinkConfig {
    fn default() -> Self {
        Self { buffer_size: 1024 }
    }
}

/// Publishes every recorded event onto a `tokio::sync::broadcast` channel.
/// `record` never blocks on subscribers: if there are none, or a
/// subscriber is lagging, the send simply has no effect on the caller.
pub struct BroadcastAuditSink {
    sender: broadcast::Sender<AuditEvent>,
}

impl BroadcastAuditSink {
    pub fn new() -> Self {
        Self::with_config(BroadcastAuditSinkConfig::default())
    }

    pub fn with_config(config: BroadcastAuditSinkConfig) -> Self {
        let (sender, _receiver) = broadcast::channel(config.buffer_size.max(1));
        Self { sender }
    }

    /// Subscribes to the live event stream. Each subscriber receives its
    /// own cursor into the channel; events recorded before subscribing are
    /// not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for BroadcastAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        // `send` only errors when there are no receivers, which is a
        // normal and expected state for a fire-and-forget sink.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_types::ids::TenantId;
    use acs_types::ports::audit::AuditCategory;

    fn sample_event() -> AuditEvent {
        AuditEvent::new(
            TenantId::new("t1"),
            0,
            "alice",
            AuditCategory::AdminMutation,
            "user",
            "1",
            "{}",
        )
    }

    #[tokio::test]
    async fn subscriber_receives_recorded_events() {
        let sink = BroadcastAuditSink::new();
        let mut receiver = sink.subscribe();
        sink.record(sample_event()).await.unwrap();
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.actor, "alice");
    }

    #[tokio::test]
    async fn recording_without_subscribers_does_not_error() {
        let sink = BroadcastAuditSink::new();
        assert!(sink.record(sample_event()).await.is_ok());
        assert_eq!(sink.subscriber_count(), 0);
    }
}
