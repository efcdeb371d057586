//! Audit sink adapters implementing `acs_types::ports::audit::AuditSink`.
//!
//! Three adapters are provided, selectable independently or composed
//! (e.g. a transport layer can record into both the in-memory sink for
//! an admin "recent activity" view and the broadcast sink for a live
//! anomaly watcher):
//!
//! - [`memory::InMemoryAuditSink`]: bounded, ordered, in-process buffer.
//! - [`tracing_sink::TracingAuditSink`]: forwards to the `tracing` pipeline.
//! - [`broadcast::BroadcastAuditSink`]: live multi-subscriber event stream.

pub mod broadcast;
pub mod memory;
pub mod tracing_sink;

pub use broadcast::{BroadcastAuditSink, BroadcastAuditSinkConfig};
pub use memory::InMemoryAuditSink;
pub use tracing_sink::TracingAuditSink;
