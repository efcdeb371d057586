//! Stable identifiers shared across the access control system.
//!
//! Every node in the permission graph is addressed by a small integer id,
//! scoped to a tenant. Callers never hold references into the graph itself
//! (see the arena design in `acs-graph`), only these ids.

use std::fmt;

/// Tenant identifier. Opaque, non-empty, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Fallback tenant a transport layer should use when no tenant can be
    /// resolved from the incoming request (see the tenant resolution order
    /// documented alongside the external interfaces).
    pub const DEFAULT: &'static str = "default";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

macro_rules! node_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

node_id!(UserId, "Identifies a principal (user) within a tenant.");
node_id!(GroupId, "Identifies a group within a tenant.");
node_id!(RoleId, "Identifies a role within a tenant.");
node_id!(ResourceId, "Identifies a resource (URI pattern) within a tenant.");
node_id!(
    EntityId,
    "Identifies the polymorphic permission owner backing a user, group, or role."
);
node_id!(VerbId, "Identifies a tenant-scoped verb such as GET or WRITE.");
node_id!(
    SchemeId,
    "Identifies a permission scheme anchoring a set of URI accesses to an entity."
);

/// A composite key used by the rate limiter and its backing store:
/// `"{tenant}:{id}"`. Kept as a distinct type so callers cannot accidentally
/// pass an unscoped id where a tenant-scoped key is required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn new(tenant: &TenantId, id: &str) -> Self {
        Self(format!("{}:{}", tenant.as_str(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_default_is_stable() {
        assert_eq!(TenantId::default().as_str(), "default");
        assert_eq!(TenantId::DEFAULT, "default");
    }

    #[test]
    fn composite_key_formats_tenant_colon_id() {
        let tenant = TenantId::new("acme");
        let key = CompositeKey::new(&tenant, "user-42");
        assert_eq!(key.as_str(), "acme:user-42");
    }

    #[test]
    fn node_ids_round_trip_through_u64() {
        let id = UserId::from(7u64);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }
}
