//! Mutating admin API (C7) over the permission graph.
//!
//! `AdminApi` is the only supported way to mutate a tenant's
//! `PermissionGraph`: every operation here delegates to the graph's write
//! methods (which already serialize per-tenant behind a `RwLock`, see
//! `acs_graph::graph`), then invalidates the evaluator's decision cache for
//! that tenant and emits exactly one audit event before returning.
//!
//! - [`api`]: the `AdminApi` struct and its operations.

pub mod api;

pub use api::AdminApi;
