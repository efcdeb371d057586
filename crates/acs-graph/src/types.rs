//! Node and edge-fact types stored in a tenant's arena.

use acs_types::ids::{EntityId, GroupId, ResourceId, RoleId, SchemeId, UserId, VerbId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub entity_id: EntityId,
    pub email: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub entity_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub entity_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub uri_pattern: String,
}

/// Which concrete node kind an [`EntityId`] refers to. An entity is a pure
/// capability anchor: exactly one of these backs any given `EntityId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOwner {
    User(UserId),
    Group(GroupId),
    Role(RoleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub owner: EntityOwner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionScheme {
    pub id: SchemeId,
    pub entity_id: EntityId,
}

/// A single grant-or-deny fact. Exactly one of `grant`/`deny` is `true`;
/// the graph's `set_access` constructor is the only way to build one and
/// enforces this invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriAccess {
    pub scheme_id: SchemeId,
    pub resource_id: ResourceId,
    pub verb_id: VerbId,
    pub grant: bool,
    pub deny: bool,
}

impl UriAccess {
    pub fn grant(scheme_id: SchemeId, resource_id: ResourceId, verb_id: VerbId) -> Self {
        Self {
            scheme_id,
            resource_id,
            verb_id,
            grant: true,
            deny: false,
        }
    }

    pub fn deny(scheme_id: SchemeId, resource_id: ResourceId, verb_id: VerbId) -> Self {
        Self {
            scheme_id,
            resource_id,
            verb_id,
            grant: false,
            deny: true,
        }
    }
}

/// Scope used by traversal queries that can return either the direct edge
/// set or its transitive closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Direct,
    Transitive,
}

/// Scope used when resolving a user's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    Direct,
    Inherited,
    Effective,
}
