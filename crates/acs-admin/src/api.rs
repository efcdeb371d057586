//! `AdminApi`: validated mutations over a [`PermissionGraph`], each paired
//! with evaluator cache invalidation and exactly one audit event.

use std::sync::Arc;

use acs_evaluator::Evaluator;
use acs_graph::types::Scope;
use acs_graph::PermissionGraph;
use acs_types::error::{AcsError, Result};
use acs_types::ids::{EntityId, GroupId, ResourceId, RoleId, TenantId, UserId};
use acs_types::ports::{AuditCategory, AuditEvent, AuditSink, RateLimiter};
use tracing::instrument;

/// Mutating API over the permission graph (C7).
///
/// Every method here is the single entry point for its mutation: it
/// delegates to the graph (which enforces the invariant and serializes the
/// write behind that tenant's lock), invalidates the evaluator's decision
/// cache for the tenant, and records one audit event before returning.
/// Validation/Conflict/NotFound errors from the graph propagate unchanged;
/// no audit event is recorded for a rejected mutation.
pub struct AdminApi {
    graph: Arc<PermissionGraph>,
    evaluator: Arc<Evaluator>,
    audit: Arc<dyn AuditSink>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AdminApi {
    pub fn new(
        graph: Arc<PermissionGraph>,
        evaluator: Arc<Evaluator>,
        audit: Arc<dyn AuditSink>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            graph,
            evaluator,
            audit,
            rate_limiter,
        }
    }

    async fn settle(
        &self,
        tenant: &TenantId,
        actor: &str,
        entity_type: &str,
        entity_id: impl std::fmt::Display,
        details: impl Into<String>,
    ) {
        self.evaluator.invalidate_tenant(tenant);
        let event = AuditEvent::new(
            tenant.clone(),
            chrono::Utc::now().timestamp_millis(),
            actor,
            AuditCategory::AdminMutation,
            entity_type,
            entity_id.to_string(),
            details,
        );
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(%tenant, %actor, error = %err, "audit sink rejected admin-mutation event");
        }
    }

    #[instrument(skip(self))]
    pub async fn create_user(&self, tenant: &TenantId, actor: &str, email: &str) -> Result<UserId> {
        let id = self.graph.create_user(tenant, email).await?;
        self.settle(tenant, actor, "User", id, format!("created user {email:?}"))
            .await;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn create_group(&self, tenant: &TenantId, actor: &str, name: &str) -> Result<GroupId> {
        let id = self.graph.create_group(tenant, name).await?;
        self.settle(tenant, actor, "Group", id, format!("created group {name:?}"))
            .await;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn create_role(&self, tenant: &TenantId, actor: &str, name: &str) -> Result<RoleId> {
        let id = self.graph.create_role(tenant, name).await?;
        self.settle(tenant, actor, "Role", id, format!("created role {name:?}"))
            .await;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn create_resource(
        &self,
        tenant: &TenantId,
        actor: &str,
        uri_pattern: &str,
    ) -> Result<ResourceId> {
        let id = self.graph.create_resource(tenant, uri_pattern).await?;
        self.settle(
            tenant,
            actor,
            "Resource",
            id,
            format!("created resource pattern {uri_pattern:?}"),
        )
        .await;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn add_user_to_group(
        &self,
        tenant: &TenantId,
        actor: &str,
        user: UserId,
        group: GroupId,
    ) -> Result<()> {
        // Idempotent at the graph layer: re-adding an existing member is a
        // set insert, not a conflict, so the second call is a no-op that
        // still settles (invalidate + audit) rather than erroring.
        self.graph.add_user_to_group(tenant, user, group).await?;
        self.settle(
            tenant,
            actor,
            "Membership",
            format!("{user}->{group}"),
            format!("added user {user} to group {group}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_user_from_group(
        &self,
        tenant: &TenantId,
        actor: &str,
        user: UserId,
        group: GroupId,
    ) -> Result<()> {
        self.graph.remove_user_from_group(tenant, user, group).await?;
        self.settle(
            tenant,
            actor,
            "Membership",
            format!("{user}->{group}"),
            format!("removed user {user} from group {group}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn link_groups(
        &self,
        tenant: &TenantId,
        actor: &str,
        parent: GroupId,
        child: GroupId,
    ) -> Result<()> {
        self.graph.link_groups(tenant, parent, child).await?;
        self.settle(
            tenant,
            actor,
            "GroupHierarchy",
            format!("{parent}->{child}"),
            format!("linked group {parent} as parent of {child}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unlink_groups(
        &self,
        tenant: &TenantId,
        actor: &str,
        parent: GroupId,
        child: GroupId,
    ) -> Result<()> {
        self.graph.unlink_groups(tenant, parent, child).await?;
        self.settle(
            tenant,
            actor,
            "GroupHierarchy",
            format!("{parent}->{child}"),
            format!("unlinked group {parent} from {child}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn assign_role_to_user(
        &self,
        tenant: &TenantId,
        actor: &str,
        user: UserId,
        role: RoleId,
    ) -> Result<()> {
        self.graph.assign_role_to_user(tenant, user, role).await?;
        self.settle(
            tenant,
            actor,
            "RoleAssignment",
            format!("user:{user}->{role}"),
            format!("assigned role {role} to user {user}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unassign_role_from_user(
        &self,
        tenant: &TenantId,
        actor: &str,
        user: UserId,
        role: RoleId,
    ) -> Result<()> {
        self.graph.unassign_role_from_user(tenant, user, role).await?;
        self.settle(
            tenant,
            actor,
            "RoleAssignment",
            format!("user:{user}->{role}"),
            format!("unassigned role {role} from user {user}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn assign_role_to_group(
        &self,
        tenant: &TenantId,
        actor: &str,
        group: GroupId,
        role: RoleId,
    ) -> Result<()> {
        self.graph.assign_role_to_group(tenant, group, role).await?;
        self.settle(
            tenant,
            actor,
            "RoleAssignment",
            format!("group:{group}->{role}"),
            format!("assigned role {role} to group {group}"),
        )
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unassign_role_from_group(
        &self,
        tenant: &TenantId,
        actor: &str,
        group: GroupId,
        role: RoleId,
    ) -> Result<()> {
        self.graph
            .unassign_role_from_group(tenant, group, role)
            .await?;
        self.settle(
            tenant,
            actor,
            "RoleAssignment",
            format!("group:{group}->{role}"),
            format!("unassigned role {role} from group {group}"),
        )
        .await;
        Ok(())
    }

    /// Sets one grant-or-deny fact directly by entity id. The three
    /// `set_*_access` wrappers below resolve a user/group/role to its
    /// backing entity id first; this is the primitive they share.
    #[instrument(skip(self))]
    pub async fn set_access(
        &self,
        tenant: &TenantId,
        actor: &str,
        entity_id: EntityId,
        resource_id: ResourceId,
        verb: &str,
        grant: bool,
    ) -> Result<()> {
        self.graph
            .set_access(tenant, entity_id, resource_id, verb, grant)
            .await?;
        let verdict = if grant { "grant" } else { "deny" };
        self.settle(
            tenant,
            actor,
            "UriAccess",
            format!("{entity_id}:{resource_id}:{verb}"),
            format!("set {verdict} for entity {entity_id} on resource {resource_id} verb {verb}"),
        )
        .await;
        Ok(())
    }

    pub async fn set_user_access(
        &self,
        tenant: &TenantId,
        actor: &str,
        user: UserId,
        resource_id: ResourceId,
        verb: &str,
        grant: bool,
    ) -> Result<()> {
        let entity_id = self
            .graph
            .entity_id_for_user(tenant, user)
            .await
            .ok_or_else(|| AcsError::not_found(format!("user {user}")))?;
        self.set_access(tenant, actor, entity_id, resource_id, verb, grant).await
    }

    pub async fn set_group_access(
        &self,
        tenant: &TenantId,
        actor: &str,
        group: GroupId,
        resource_id: ResourceId,
        verb: &str,
        grant: bool,
    ) -> Result<()> {
        let entity_id = self
            .graph
            .entity_id_for_group(tenant, group)
            .await
            .ok_or_else(|| AcsError::not_found(format!("group {group}")))?;
        self.set_access(tenant, actor, entity_id, resource_id, verb, grant).await
    }

    pub async fn set_role_access(
        &self,
        tenant: &TenantId,
        actor: &str,
        role: RoleId,
        resource_id: ResourceId,
        verb: &str,
        grant: bool,
    ) -> Result<()> {
        let entity_id = self
            .graph
            .entity_id_for_role(tenant, role)
            .await
            .ok_or_else(|| AcsError::not_found(format!("role {role}")))?;
        self.set_access(tenant, actor, entity_id, resource_id, verb, grant).await
    }

    /// Resets a rate-limit key. Distinct from the graph mutations above:
    /// it touches C1/C2 state, not C3, so there is nothing to invalidate
    /// in the evaluator's decision cache, but the reset is still an
    /// admin-mutation worth auditing.
    #[instrument(skip(self))]
    pub async fn reset_rate_limit(&self, tenant: &TenantId, actor: &str, id: &str) -> Result<()> {
        self.rate_limiter.reset(tenant, id).await?;
        let event = AuditEvent::new(
            tenant.clone(),
            chrono::Utc::now().timestamp_millis(),
            actor,
            AuditCategory::AdminMutation,
            "RateLimitKey",
            id,
            "reset rate limit counter",
        );
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(%tenant, %actor, error = %err, "audit sink rejected rate-limit reset event");
        }
        Ok(())
    }

    /// Whether `candidate` is an ancestor of `group` in the group DAG, the
    /// same cycle check `link_groups` performs internally. Exposed so
    /// callers (and tests) can confirm the DAG invariant without having to
    /// provoke a rejection first.
    pub async fn is_ancestor(&self, tenant: &TenantId, candidate: GroupId, group: GroupId) -> bool {
        self.graph.is_ancestor(tenant, candidate, group).await
    }

    pub async fn groups_for_user(&self, tenant: &TenantId, user: UserId, scope: Scope) -> Vec<GroupId> {
        self.graph.groups_for_user(tenant, user, scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_audit::InMemoryAuditSink;
    use acs_ratelimit::store::memory::InMemoryRateLimitStore;
    use acs_ratelimit::SlidingWindowRateLimiter;

    fn make_api() -> AdminApi {
        let graph = Arc::new(PermissionGraph::new());
        let evaluator = Arc::new(Evaluator::new(graph.clone()));
        let audit: Arc<dyn AuditSink> = Arc::new(InMemoryAuditSink::new(256));
        let store = Arc::new(InMemoryRateLimitStore::new());
        let rate_limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindowRateLimiter::new(store));
        AdminApi::new(graph, evaluator, audit, rate_limiter)
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let api = make_api();
        let tenant = TenantId::new("acme");
        api.create_user(&tenant, "root", "alice@example.com")
            .await
            .unwrap();
        let err = api
            .create_user(&tenant, "root", "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AcsError::Conflict(_)));
    }

    #[tokio::test]
    async fn link_groups_rejects_cycle() {
        let api = make_api();
        let tenant = TenantId::new("acme");
        let a = api.create_group(&tenant, "root", "a").await.unwrap();
        let b = api.create_group(&tenant, "root", "b").await.unwrap();
        let c = api.create_group(&tenant, "root", "c").await.unwrap();

        api.link_groups(&tenant, "root", a, b).await.unwrap();
        api.link_groups(&tenant, "root", b, c).await.unwrap();

        let err = api.link_groups(&tenant, "root", c, a).await.unwrap_err();
        assert!(matches!(err, AcsError::Validation(_)));
        assert!(api.is_ancestor(&tenant, a, c).await);
        assert!(!api.is_ancestor(&tenant, c, a).await);
    }

    #[tokio::test]
    async fn add_user_to_group_is_idempotent() {
        let api = make_api();
        let tenant = TenantId::new("acme");
        let user = api
            .create_user(&tenant, "root", "bob@example.com")
            .await
            .unwrap();
        let group = api.create_group(&tenant, "root", "eng").await.unwrap();

        api.add_user_to_group(&tenant, "root", user, group).await.unwrap();
        api.add_user_to_group(&tenant, "root", user, group).await.unwrap();

        let groups = api.groups_for_user(&tenant, user, Scope::Direct).await;
        assert_eq!(groups, vec![group]);
    }

    #[tokio::test]
    async fn set_access_requires_exactly_known_entity() {
        let api = make_api();
        let tenant = TenantId::new("acme");
        let resource = api.create_resource(&tenant, "root", "/docs/*").await.unwrap();
        let missing_user = UserId::new(9999);

        let err = api
            .set_user_access(&tenant, "root", missing_user, resource, "READ", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AcsError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_rate_limit_emits_audit_event() {
        let api = make_api();
        let tenant = TenantId::new("acme");
        api.reset_rate_limit(&tenant, "root", "user-1").await.unwrap();
    }
}
