//! The authorization evaluator (C4): resolves `(tenant, principal, verb,
//! uri)` to an [`decision::EvaluationResult`] by gathering the applicable
//! `UriAccess` rows from `acs-graph` and combining them under a deny-wins
//! rule, with a short-TTL decision cache the admin API invalidates on
//! every mutation.
//!
//! - [`decision`]: `Decision`, `ReasonEntry`, `EvaluationResult`.
//! - [`cache`]: the per-tenant short-TTL decision cache.
//! - [`evaluator`]: `Evaluator` itself.

pub mod cache;
pub mod decision;
pub mod evaluator;

pub use decision::{Decision, EvaluationResult, ReasonEntry};
pub use evaluator::{Evaluator, DEFAULT_CACHE_TTL};
