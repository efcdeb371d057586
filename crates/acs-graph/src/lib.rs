//! The permission graph: an arena-based model of users, groups, roles,
//! entities, permission schemes, and resources, with the reads and writes
//! the evaluator and admin API need.
//!
//! Nodes never hold owning references to one another; every relationship
//! is an id pair in an adjacency map, and every node is addressed through
//! its stable integer id (see `acs_types::ids`). Writes to a tenant are
//! serialized through that tenant's `RwLock`; reads may run concurrently
//! with each other but never observe a torn structure.

pub mod arena;
pub mod graph;
pub mod membership;
pub mod pattern;
pub mod types;

pub use graph::PermissionGraph;
pub use pattern::CompiledPattern;
pub use types::{
    Entity, EntityOwner, Group, PermissionScheme, Resource, Role, RoleScope, Scope, UriAccess, User,
};
