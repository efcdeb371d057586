//! The top-level `PermissionGraph`: one arena per tenant, guarded by a
//! `RwLock` so writes to a tenant are serialized while reads proceed
//! concurrently, and tenants never contend with each other.

use std::sync::Arc;

use acs_types::error::{AcsError, Result};
use acs_types::ids::{EntityId, GroupId, ResourceId, RoleId, SchemeId, TenantId, UserId, VerbId};
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::arena::TenantArena;
use crate::membership;
use crate::pattern::CompiledPattern;
use crate::types::{EntityOwner, Group, PermissionScheme, Resource, RoleScope, Scope, UriAccess, User};

/// Arena-based permission graph, indexed by `(tenantId, id)`.
#[derive(Default)]
pub struct PermissionGraph {
    tenants: DashMap<TenantId, Arc<RwLock<TenantArena>>>,
}

impl PermissionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant_arena(&self, tenant: &TenantId) -> Arc<RwLock<TenantArena>> {
        self.tenants
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(RwLock::new(TenantArena::new())))
            .clone()
    }

    // ---- reads -----------------------------------------------------

    pub async fn get_user(&self, tenant: &TenantId, id: UserId) -> Option<User> {
        self.tenant_arena(tenant).read().await.users.get(&id).cloned()
    }

    pub async fn get_group(&self, tenant: &TenantId, id: GroupId) -> Option<Group> {
        self.tenant_arena(tenant).read().await.groups.get(&id).cloned()
    }

    pub async fn get_role(&self, tenant: &TenantId, id: RoleId) -> Option<crate::types::Role> {
        self.tenant_arena(tenant).read().await.roles.get(&id).cloned()
    }

    pub async fn get_resource(&self, tenant: &TenantId, id: ResourceId) -> Option<Resource> {
        self.tenant_arena(tenant)
            .read()
            .await
            .resources
            .get(&id)
            .cloned()
    }

    pub async fn users_in_group(
        &self,
        tenant: &TenantId,
        group: GroupId,
        scope: Scope,
    ) -> Vec<UserId> {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;

        let groups_to_check: Vec<GroupId> = match scope {
            Scope::Direct => vec![group],
            Scope::Transitive => {
                let mut all = membership::descendants(&arena, group);
                all.insert(group);
                all.into_iter().collect()
            }
        };

        arena
            .user_groups
            .iter()
            .filter(|(_, groups)| groups_to_check.iter().any(|g| groups.contains(g)))
            .map(|(user, _)| *user)
            .collect()
    }

    pub async fn groups_for_user(
        &self,
        tenant: &TenantId,
        user: UserId,
        scope: Scope,
    ) -> Vec<GroupId> {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;
        let direct = arena.user_groups.get(&user).cloned().unwrap_or_default();

        match scope {
            Scope::Direct => direct.into_iter().collect(),
            Scope::Transitive => {
                let mut all = direct.clone();
                for g in direct {
                    all.extend(membership::ancestors(&arena, g));
                }
                all.into_iter().collect()
            }
        }
    }

    pub async fn roles_for_user(
        &self,
        tenant: &TenantId,
        user: UserId,
        scope: RoleScope,
    ) -> Vec<RoleId> {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;

        let direct = arena
            .user_roles_direct
            .get(&user)
            .cloned()
            .unwrap_or_default();

        if matches!(scope, RoleScope::Direct) {
            return direct.into_iter().collect();
        }

        let groups = {
            let direct_groups = arena.user_groups.get(&user).cloned().unwrap_or_default();
            let mut all = direct_groups.clone();
            for g in direct_groups {
                all.extend(membership::ancestors(&arena, g));
            }
            all
        };

        let inherited: std::collections::HashSet<RoleId> = groups
            .iter()
            .flat_map(|g| arena.group_roles.get(g).cloned().unwrap_or_default())
            .collect();

        match scope {
            RoleScope::Direct => unreachable!(),
            RoleScope::Inherited => inherited.into_iter().collect(),
            RoleScope::Effective => direct.union(&inherited).copied().collect(),
        }
    }

    pub async fn resources_matching(&self, tenant: &TenantId, uri: &str) -> Vec<Resource> {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;

        arena
            .resources
            .values()
            .filter(|r| {
                arena
                    .compiled_patterns
                    .get(&r.id)
                    .map(|p| p.matches(uri))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// `uri_accesses` applicable to the given entities, verb, and resource
    /// set. Used by the evaluator to gather the rules it must combine.
    pub async fn applicable_accesses(
        &self,
        tenant: &TenantId,
        entities: &[EntityId],
        verb: VerbId,
        resources: &[ResourceId],
    ) -> Vec<UriAccess> {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;

        let scheme_ids: Vec<SchemeId> = arena
            .schemes
            .values()
            .filter(|s| entities.contains(&s.entity_id))
            .map(|s| s.id)
            .collect();

        scheme_ids
            .iter()
            .flat_map(|sid| arena.uri_accesses.get(sid).cloned().unwrap_or_default())
            .filter(|access| access.verb_id == verb && resources.contains(&access.resource_id))
            .collect()
    }

    /// Resolves a verb name to its id without creating one; used by the
    /// evaluator, which must never mint new verbs as a side effect of a
    /// read-only authorization check.
    pub async fn lookup_verb(&self, tenant: &TenantId, name: &str) -> Option<VerbId> {
        self.tenant_arena(tenant)
            .read()
            .await
            .verbs_by_name
            .get(name)
            .copied()
    }

    pub async fn entity_id_for_user(&self, tenant: &TenantId, user: UserId) -> Option<EntityId> {
        self.tenant_arena(tenant)
            .read()
            .await
            .entity_for(EntityOwner::User(user))
    }

    pub async fn entity_id_for_group(&self, tenant: &TenantId, group: GroupId) -> Option<EntityId> {
        self.tenant_arena(tenant)
            .read()
            .await
            .entity_for(EntityOwner::Group(group))
    }

    pub async fn entity_id_for_role(&self, tenant: &TenantId, role: RoleId) -> Option<EntityId> {
        self.tenant_arena(tenant)
            .read()
            .await
            .entity_for(EntityOwner::Role(role))
    }

    pub async fn is_ancestor(&self, tenant: &TenantId, candidate: GroupId, group: GroupId) -> bool {
        let arena = self.tenant_arena(tenant);
        let arena = arena.read().await;
        membership::is_ancestor(&arena, candidate, group)
    }

    // ---- writes ------------------------------------------------------
    //
    // Every write takes the tenant's exclusive lock for its own duration,
    // which is what serializes mutations to one tenant (see the
    // concurrency model). `acs-admin` is the intended caller; it layers
    // audit emission on top of these calls but does not need its own
    // additional locking.

    pub async fn create_user(&self, tenant: &TenantId, email: &str) -> Result<UserId> {
        if email.trim().is_empty() {
            return Err(AcsError::validation("user email must not be empty"));
        }
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if arena.emails.contains(email) {
            return Err(AcsError::conflict(format!("user {email} already exists")));
        }

        let (user_id, entity_id) = arena.alloc_user_entity();
        arena.users.insert(
            user_id,
            User {
                id: user_id,
                entity_id,
                email: email.to_string(),
                active: true,
            },
        );
        arena.emails.insert(email.to_string());
        Ok(user_id)
    }

    pub async fn create_group(&self, tenant: &TenantId, name: &str) -> Result<GroupId> {
        if name.trim().is_empty() {
            return Err(AcsError::validation("group name must not be empty"));
        }
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if arena.group_names.contains(name) {
            return Err(AcsError::conflict(format!("group {name} already exists")));
        }

        let (group_id, entity_id) = arena.alloc_group_entity();
        arena.groups.insert(
            group_id,
            Group {
                id: group_id,
                entity_id,
                name: name.to_string(),
            },
        );
        arena.group_names.insert(name.to_string());
        Ok(group_id)
    }

    pub async fn create_role(&self, tenant: &TenantId, name: &str) -> Result<RoleId> {
        if name.trim().is_empty() {
            return Err(AcsError::validation("role name must not be empty"));
        }
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if arena.role_names.contains(name) {
            return Err(AcsError::conflict(format!("role {name} already exists")));
        }

        let (role_id, entity_id) = arena.alloc_role_entity();
        arena.roles.insert(
            role_id,
            crate::types::Role {
                id: role_id,
                entity_id,
                name: name.to_string(),
            },
        );
        arena.role_names.insert(name.to_string());
        Ok(role_id)
    }

    pub async fn create_resource(&self, tenant: &TenantId, uri_pattern: &str) -> Result<ResourceId> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if arena.uri_patterns.contains(uri_pattern) {
            return Err(AcsError::conflict(format!(
                "resource pattern {uri_pattern:?} already exists"
            )));
        }

        let compiled = CompiledPattern::compile(uri_pattern)?;
        let resource_id = arena.alloc_resource();
        arena.resources.insert(
            resource_id,
            Resource {
                id: resource_id,
                uri_pattern: uri_pattern.to_string(),
            },
        );
        arena.uri_patterns.insert(uri_pattern.to_string());
        arena.compiled_patterns.insert(resource_id, compiled);
        Ok(resource_id)
    }

    pub async fn add_user_to_group(&self, tenant: &TenantId, user: UserId, group: GroupId) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        if !arena.users.contains_key(&user) {
            return Err(AcsError::not_found(format!("user {user}")));
        }
        if !arena.groups.contains_key(&group) {
            return Err(AcsError::not_found(format!("group {group}")));
        }
        arena.user_groups.entry(user).or_default().insert(group);
        Ok(())
    }

    pub async fn remove_user_from_group(
        &self,
        tenant: &TenantId,
        user: UserId,
        group: GroupId,
    ) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        let removed = arena
            .user_groups
            .get_mut(&user)
            .map(|groups| groups.remove(&group))
            .unwrap_or(false);

        if !removed {
            return Err(AcsError::conflict(format!(
                "user {user} is not a member of group {group}"
            )));
        }
        Ok(())
    }

    pub async fn link_groups(&self, tenant: &TenantId, parent: GroupId, child: GroupId) -> Result<()> {
        if parent == child {
            return Err(AcsError::validation("a group cannot be its own parent"));
        }
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if !arena.groups.contains_key(&parent) {
            return Err(AcsError::not_found(format!("group {parent}")));
        }
        if !arena.groups.contains_key(&child) {
            return Err(AcsError::not_found(format!("group {child}")));
        }
        if membership::is_ancestor(&arena, child, parent) {
            return Err(AcsError::validation(format!(
                "linking group {parent} -> {child} would create a cycle"
            )));
        }

        arena.group_children.entry(parent).or_default().insert(child);
        arena.group_parents.entry(child).or_default().insert(parent);
        Ok(())
    }

    pub async fn unlink_groups(&self, tenant: &TenantId, parent: GroupId, child: GroupId) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        let removed = arena
            .group_children
            .get_mut(&parent)
            .map(|children| children.remove(&child))
            .unwrap_or(false);

        if removed {
            if let Some(parents) = arena.group_parents.get_mut(&child) {
                parents.remove(&parent);
            }
            Ok(())
        } else {
            Err(AcsError::conflict(format!(
                "group {child} is not a direct child of {parent}"
            )))
        }
    }

    pub async fn assign_role_to_user(&self, tenant: &TenantId, user: UserId, role: RoleId) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        if !arena.users.contains_key(&user) {
            return Err(AcsError::not_found(format!("user {user}")));
        }
        if !arena.roles.contains_key(&role) {
            return Err(AcsError::not_found(format!("role {role}")));
        }
        arena.user_roles_direct.entry(user).or_default().insert(role);
        Ok(())
    }

    pub async fn unassign_role_from_user(
        &self,
        tenant: &TenantId,
        user: UserId,
        role: RoleId,
    ) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        let removed = arena
            .user_roles_direct
            .get_mut(&user)
            .map(|roles| roles.remove(&role))
            .unwrap_or(false);
        if removed {
            Ok(())
        } else {
            Err(AcsError::conflict(format!(
                "user {user} does not directly have role {role}"
            )))
        }
    }

    pub async fn assign_role_to_group(
        &self,
        tenant: &TenantId,
        group: GroupId,
        role: RoleId,
    ) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        if !arena.groups.contains_key(&group) {
            return Err(AcsError::not_found(format!("group {group}")));
        }
        if !arena.roles.contains_key(&role) {
            return Err(AcsError::not_found(format!("role {role}")));
        }
        arena.group_roles.entry(group).or_default().insert(role);
        Ok(())
    }

    pub async fn unassign_role_from_group(
        &self,
        tenant: &TenantId,
        group: GroupId,
        role: RoleId,
    ) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;
        let removed = arena
            .group_roles
            .get_mut(&group)
            .map(|roles| roles.remove(&role))
            .unwrap_or(false);
        if removed {
            Ok(())
        } else {
            Err(AcsError::conflict(format!(
                "group {group} does not have role {role}"
            )))
        }
    }

    /// Sets one grant-or-deny fact. Exactly one of `grant`/`deny` results;
    /// `grant = true` records a grant, `grant = false` records a deny.
    /// Creates the entity's permission scheme on first use.
    pub async fn set_access(
        &self,
        tenant: &TenantId,
        entity_id: EntityId,
        resource_id: ResourceId,
        verb_name: &str,
        grant: bool,
    ) -> Result<()> {
        let arena = self.tenant_arena(tenant);
        let mut arena = arena.write().await;

        if !arena.entities.contains_key(&entity_id) {
            return Err(AcsError::not_found(format!("entity {entity_id}")));
        }
        if !arena.resources.contains_key(&resource_id) {
            return Err(AcsError::not_found(format!("resource {resource_id}")));
        }

        let scheme_id = match arena
            .schemes
            .values()
            .find(|s| s.entity_id == entity_id)
            .map(|s| s.id)
        {
            Some(id) => id,
            None => {
                let id = arena.alloc_scheme();
                arena.schemes.insert(id, PermissionScheme { id, entity_id });
                id
            }
        };

        let verb_id = arena.verb_id_for(verb_name);

        let access = if grant {
            UriAccess::grant(scheme_id, resource_id, verb_id)
        } else {
            UriAccess::deny(scheme_id, resource_id, verb_id)
        };

        let rows = arena.uri_accesses.entry(scheme_id).or_default();
        rows.retain(|a| !(a.resource_id == resource_id && a.verb_id == verb_id));
        rows.push(access);

        arena
            .resource_referents
            .entry(resource_id)
            .or_default()
            .insert(scheme_id);

        Ok(())
    }
}
