//! Guarded action types
//!
//! The engine treats actions as opaque apart from handing them to caveat
//! hooks and to the dispatcher.

use crate::identifiers::PrincipalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single call: target, attached value and payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Principal the call is addressed to
    pub target: PrincipalId,
    /// Native value moved with the call
    pub value: u128,
    /// Opaque call payload; the first four bytes are conventionally a method selector
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

impl Action {
    /// Create an action
    pub fn new(target: PrincipalId, value: u128, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            target,
            value,
            payload: payload.into(),
        }
    }

    /// Method selector, if the payload is long enough to carry one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.payload.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Shape of the calls carried by one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallType {
    /// One call
    Single,
    /// Several calls executed in order
    Batch,
}

/// Calls performed for one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    /// Exactly one call
    Single(Action),
    /// Ordered list of calls
    Batch(Vec<Action>),
}

impl Execution {
    /// Call type of this execution
    pub fn call_type(&self) -> CallType {
        match self {
            Execution::Single(_) => CallType::Single,
            Execution::Batch(_) => CallType::Batch,
        }
    }

    /// The calls, in dispatch order
    pub fn actions(&self) -> &[Action] {
        match self {
            Execution::Single(action) => std::slice::from_ref(action),
            Execution::Batch(actions) => actions,
        }
    }

    /// Sum of attached values, or `None` if it does not fit in a `u128`.
    pub fn checked_total_value(&self) -> Option<u128> {
        self.actions()
            .iter()
            .try_fold(0u128, |acc, a| acc.checked_add(a.value))
    }

    /// Number of calls
    pub fn len(&self) -> usize {
        self.actions().len()
    }

    /// Whether there are no calls at all
    pub fn is_empty(&self) -> bool {
        self.actions().is_empty()
    }
}

impl From<Action> for Execution {
    fn from(action: Action) -> Self {
        Execution::Single(action)
    }
}

/// Per-item failure handling of the guarded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// A failing action aborts the entire redemption call
    #[default]
    Default,
    /// A failing action is recorded, its own effects are undone, and the batch continues
    Try,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Default => f.write_str("default"),
            ExecutionMode::Try => f.write_str("try"),
        }
    }
}
