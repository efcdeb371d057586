//! The per-tenant arena: every node and edge fact for one tenant, plus the
//! monotonic id counters used to allocate new nodes.

use std::collections::{HashMap, HashSet};

use acs_types::ids::{EntityId, GroupId, ResourceId, RoleId, SchemeId, UserId, VerbId};

use crate::pattern::CompiledPattern;
use crate::types::{Entity, EntityOwner, Group, PermissionScheme, Resource, Role, UriAccess, User};

#[derive(Default)]
struct Counters {
    user: u64,
    group: u64,
    role: u64,
    resource: u64,
    entity: u64,
    scheme: u64,
    verb: u64,
}

impl Counters {
    fn next_user(&mut self) -> UserId {
        self.user += 1;
        UserId::new(self.user)
    }
    fn next_group(&mut self) -> GroupId {
        self.group += 1;
        GroupId::new(self.group)
    }
    fn next_role(&mut self) -> RoleId {
        self.role += 1;
        RoleId::new(self.role)
    }
    fn next_resource(&mut self) -> ResourceId {
        self.resource += 1;
        ResourceId::new(self.resource)
    }
    fn next_entity(&mut self) -> EntityId {
        self.entity += 1;
        EntityId::new(self.entity)
    }
    fn next_scheme(&mut self) -> SchemeId {
        self.scheme += 1;
        SchemeId::new(self.scheme)
    }
    fn next_verb(&mut self) -> VerbId {
        self.verb += 1;
        VerbId::new(self.verb)
    }
}

/// Every node and edge fact for a single tenant. Never shared directly;
/// always accessed through the tenant's `RwLock` in [`crate::graph::PermissionGraph`].
#[derive(Default)]
pub struct TenantArena {
    counters: Counters,

    pub(crate) users: HashMap<UserId, User>,
    pub(crate) groups: HashMap<GroupId, Group>,
    pub(crate) roles: HashMap<RoleId, Role>,
    pub(crate) resources: HashMap<ResourceId, Resource>,
    pub(crate) entities: HashMap<EntityId, Entity>,
    pub(crate) schemes: HashMap<SchemeId, PermissionScheme>,
    pub(crate) uri_accesses: HashMap<SchemeId, Vec<UriAccess>>,

    pub(crate) verbs_by_name: HashMap<String, VerbId>,

    /// parent -> direct children
    pub(crate) group_children: HashMap<GroupId, HashSet<GroupId>>,
    /// child -> direct parents
    pub(crate) group_parents: HashMap<GroupId, HashSet<GroupId>>,

    pub(crate) user_groups: HashMap<UserId, HashSet<GroupId>>,
    pub(crate) user_roles_direct: HashMap<UserId, HashSet<RoleId>>,
    pub(crate) group_roles: HashMap<GroupId, HashSet<RoleId>>,

    /// Reverse index: resource id -> scheme ids that reference it, so
    /// `AdminApi` can reject deleting a referenced resource without a
    /// linear scan.
    pub(crate) resource_referents: HashMap<ResourceId, HashSet<SchemeId>>,

    pub(crate) compiled_patterns: HashMap<ResourceId, CompiledPattern>,

    pub(crate) emails: HashSet<String>,
    pub(crate) group_names: HashSet<String>,
    pub(crate) role_names: HashSet<String>,
    pub(crate) uri_patterns: HashSet<String>,
}

impl TenantArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_user_entity(&mut self) -> (UserId, EntityId) {
        let user_id = self.counters.next_user();
        let entity_id = self.counters.next_entity();
        self.entities.insert(
            entity_id,
            Entity {
                id: entity_id,
                owner: EntityOwner::User(user_id),
            },
        );
        (user_id, entity_id)
    }

    pub fn alloc_group_entity(&mut self) -> (GroupId, EntityId) {
        let group_id = self.counters.next_group();
        let entity_id = self.counters.next_entity();
        self.entities.insert(
            entity_id,
            Entity {
                id: entity_id,
                owner: EntityOwner::Group(group_id),
            },
        );
        (group_id, entity_id)
    }

    pub fn alloc_role_entity(&mut self) -> (RoleId, EntityId) {
        let role_id = self.counters.next_role();
        let entity_id = self.counters.next_entity();
        self.entities.insert(
            entity_id,
            Entity {
                id: entity_id,
                owner: EntityOwner::Role(role_id),
            },
        );
        (role_id, entity_id)
    }

    pub fn alloc_resource(&mut self) -> ResourceId {
        self.counters.next_resource()
    }

    pub fn alloc_scheme(&mut self) -> SchemeId {
        self.counters.next_scheme()
    }

    pub fn entity_for(&self, owner: EntityOwner) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.owner == owner)
            .map(|e| e.id)
    }

    /// Resolves a verb name to its id, allocating a new one on first use.
    pub fn verb_id_for(&mut self, name: &str) -> VerbId {
        if let Some(id) = self.verbs_by_name.get(name) {
            return *id;
        }
        let id = self.counters.next_verb();
        self.verbs_by_name.insert(name.to_string(), id);
        id
    }
}
