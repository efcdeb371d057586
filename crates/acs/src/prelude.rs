//! Convenience re-exports for embedders who only want the common surface:
//! the facade, its builder/config, and the domain types needed to call it.

pub use crate::{AcsBuilder, AcsConfig, AccessControlSystem};

pub use acs_admin::AdminApi;
pub use acs_evaluator::decision::{Decision, EvaluationResult, ReasonEntry};
pub use acs_types::error::{AcsError, Result};
pub use acs_types::ids::{
    EntityId, GroupId, ResourceId, RoleId, SchemeId, TenantId, UserId, VerbId,
};
pub use acs_types::ports::rate_limit::{Decision as RateLimitDecision, Policy};
