//! `Evaluator`: resolves `(tenant, principal, verb, uri)` to an
//! [`EvaluationResult`] by gathering applicable `UriAccess` rows and
//! combining them under a deny-wins rule.

use std::sync::Arc;
use std::time::Duration;

use acs_graph::types::Scope;
use acs_graph::PermissionGraph;
use acs_types::ids::{TenantId, UserId};
use tracing::debug;

use crate::cache::DecisionCache;
use crate::decision::{Decision, EvaluationResult, ReasonEntry};

/// Default decision-cache TTL. Short enough that a stale grant surviving
/// a missed invalidation is bounded to a few seconds.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

pub struct Evaluator {
    graph: Arc<PermissionGraph>,
    cache: DecisionCache,
}

impl Evaluator {
    pub fn new(graph: Arc<PermissionGraph>) -> Self {
        Self::with_cache_ttl(graph, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(graph: Arc<PermissionGraph>, cache_ttl: Duration) -> Self {
        Self {
            graph,
            cache: DecisionCache::new(cache_ttl),
        }
    }

    /// Must be called by the admin API after any mutation to `tenant`'s
    /// graph; see the cache's conservative invalidation contract.
    pub fn invalidate_tenant(&self, tenant: &TenantId) {
        self.cache.invalidate_tenant(tenant);
    }

    #[tracing::instrument(skip(self), fields(tenant = %tenant, principal = %principal, verb, uri))]
    pub async fn evaluate(
        &self,
        tenant: &TenantId,
        principal: UserId,
        verb: &str,
        uri: &str,
    ) -> EvaluationResult {
        if let Some(cached) = self.cache.get(tenant, principal, verb, uri) {
            debug!("decision cache hit");
            return cached;
        }

        let result = self.evaluate_uncached(tenant, principal, verb, uri).await;
        self.cache.put(tenant, principal, verb, uri, result.clone());
        result
    }

    async fn evaluate_uncached(
        &self,
        tenant: &TenantId,
        principal: UserId,
        verb: &str,
        uri: &str,
    ) -> EvaluationResult {
        let mut reasons = Vec::new();

        let Some(verb_id) = self.graph.lookup_verb(tenant, verb).await else {
            reasons.push(ReasonEntry::new(format!("verb '{verb}' is not registered for this tenant")));
            return EvaluationResult::new(Decision::NotApplicable, reasons);
        };

        let resources = self.graph.resources_matching(tenant, uri).await;
        if resources.is_empty() {
            reasons.push(ReasonEntry::new(format!("no resource pattern matches uri '{uri}'")));
            return EvaluationResult::new(Decision::NotApplicable, reasons);
        }
        reasons.push(ReasonEntry::new(format!(
            "uri '{uri}' matched {} resource pattern(s)",
            resources.len()
        )));
        let resource_ids: Vec<_> = resources.iter().map(|r| r.id).collect();

        let mut entities = Vec::new();
        if let Some(user_entity) = self.graph.entity_id_for_user(tenant, principal).await {
            entities.push(user_entity);
        } else {
            reasons.push(ReasonEntry::new("principal has no user entity in this tenant"));
            return EvaluationResult::new(Decision::NotApplicable, reasons);
        }

        let groups = self.graph.groups_for_user(tenant, principal, Scope::Transitive).await;
        for group in &groups {
            if let Some(entity) = self.graph.entity_id_for_group(tenant, *group).await {
                entities.push(entity);
            }
        }

        let roles = self
            .graph
            .roles_for_user(tenant, principal, acs_graph::types::RoleScope::Effective)
            .await;
        for role in &roles {
            if let Some(entity) = self.graph.entity_id_for_role(tenant, *role).await {
                entities.push(entity);
            }
        }
        reasons.push(ReasonEntry::new(format!(
            "principal resolves to {} entit(ies) via user/{} group(s)/{} effective role(s)",
            entities.len(),
            groups.len(),
            roles.len()
        )));

        let accesses = self
            .graph
            .applicable_accesses(tenant, &entities, verb_id, &resource_ids)
            .await;

        if accesses.is_empty() {
            reasons.push(ReasonEntry::new("no uri_access rows apply to this principal/verb/resource set"));
            return EvaluationResult::new(Decision::NotApplicable, reasons);
        }

        let deny_count = accesses.iter().filter(|a| a.deny).count();
        let grant_count = accesses.iter().filter(|a| a.grant).count();
        reasons.push(ReasonEntry::new(format!(
            "found {} applicable row(s): {grant_count} grant, {deny_count} deny",
            accesses.len()
        )));

        let decision = if deny_count > 0 {
            reasons.push(ReasonEntry::new("deny wins: at least one applicable row denies"));
            Decision::Deny
        } else if grant_count > 0 {
            reasons.push(ReasonEntry::new("no deny rows; at least one applicable row grants"));
            Decision::Allow
        } else {
            reasons.push(ReasonEntry::new("applicable rows neither grant nor deny"));
            Decision::NotApplicable
        };

        EvaluationResult::new(decision, reasons)
    }
}
