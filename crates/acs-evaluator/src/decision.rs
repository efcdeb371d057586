//! The evaluator's output type: a three-valued decision plus the reason
//! chain recorded alongside it for audit.

use serde::{Deserialize, Serialize};

/// Outcome of `Evaluator::evaluate`. `NotApplicable` is distinct from
/// `Deny` so the audit trail can tell "no matching rule" apart from "a
/// rule explicitly denied this"; callers that only need an admit/block
/// boolean should treat both as not-allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny,
    NotApplicable,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// One step of the reason chain: a single rule or intermediate fact the
/// evaluator examined en route to its decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonEntry {
    pub description: String,
}

impl ReasonEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// The full result of an evaluation: the decision plus every rule
/// examined, in the order they were considered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub decision: Decision,
    pub reasons: Vec<ReasonEntry>,
}

impl EvaluationResult {
    pub fn new(decision: Decision, reasons: Vec<ReasonEntry>) -> Self {
        Self { decision, reasons }
    }
}
