//! # ACS Types
//!
//! Shared domain types, error taxonomy, and backend-agnostic port traits for
//! the access control system. This crate has no dependency on any concrete
//! storage, transport, or metrics backend; it exists to break circular
//! dependencies between the graph, evaluator, rate-limiter, and admin crates.
//!
//! ## Organization
//!
//! - `ids`: Stable newtype identifiers shared across every component.
//! - `error`: The `AcsError` taxonomy and `Result` alias.
//! - `ports`: Trait definitions implemented by infrastructure crates.

pub mod error;
pub mod ids;
pub mod ports;

pub use error::{AcsError, Result};
pub use ids::{EntityId, GroupId, ResourceId, RoleId, SchemeId, TenantId, UserId, VerbId};
