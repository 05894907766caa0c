//! Action dispatcher boundary
//!
//! The dispatcher performs the guarded calls on behalf of the effective
//! grantor. Implementations provide [`ActionDispatcher::execute_call`];
//! the provided [`ActionDispatcher::dispatch`] applies the two calling
//! conventions over single and batch executions:
//!
//! - `Default` ("revert-on-failure"): the first failing call aborts with an error.
//! - `Try` ("return-status-on-failure"): every call runs and reports its status.
//!
//! Each call runs under its own state checkpoint, so a failing call never
//! leaves partial writes behind.

use agency_core::{
    AgencyError, Action, Execution, ExecutionMode, PrincipalId, StateError, StateStore,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status and return data of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    /// Whether the call took effect
    pub success: bool,
    /// Return data, or the failure reason as bytes for a failed call
    #[serde(with = "serde_bytes")]
    pub return_data: Vec<u8>,
}

impl CallResult {
    /// Successful call
    pub fn ok(return_data: Vec<u8>) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    /// Failed call
    pub fn failed(reason: &str) -> Self {
        Self {
            success: false,
            return_data: reason.as_bytes().to_vec(),
        }
    }

    /// This call once its item was rolled back. A successful call no longer
    /// took effect and reports `reverted`; a failed call keeps its reason.
    pub fn reverted(self) -> Self {
        if self.success {
            Self::failed(REVERTED)
        } else {
            self
        }
    }
}

/// Return data of a call undone by its item's rollback.
pub const REVERTED: &str = "reverted";

/// Per-call results of one dispatched execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// One entry per call, in dispatch order
    pub results: Vec<CallResult>,
}

impl DispatchOutcome {
    /// Whether every call took effect
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// Number of failed calls
    pub fn failed_calls(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

/// Dispatch failure under the revert-on-failure convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A call failed
    #[error("call {call} failed: {reason}")]
    CallFailed {
        /// Position of the call inside the execution
        call: usize,
        /// Dispatcher diagnostic
        reason: String,
    },

    /// Checkpoint bookkeeping failed
    #[error(transparent)]
    State(#[from] StateError),
}

impl DispatchError {
    /// Convert into the unified error for the given batch item.
    pub fn into_agency(self, batch_index: usize) -> AgencyError {
        match self {
            DispatchError::CallFailed { call, reason } => AgencyError::ActionFailed {
                index: batch_index,
                reason: format!("call {call}: {reason}"),
            },
            DispatchError::State(err) => err.into(),
        }
    }
}

/// Performs calls on behalf of a principal.
pub trait ActionDispatcher: Send + Sync + fmt::Debug {
    /// Perform one call. All effects must be written to `state`.
    fn execute_call(
        &self,
        state: &mut StateStore,
        principal: &PrincipalId,
        action: &Action,
    ) -> Result<Vec<u8>, String>;

    /// Perform an execution under the given calling convention.
    fn dispatch(
        &self,
        state: &mut StateStore,
        principal: &PrincipalId,
        execution: &Execution,
        mode: ExecutionMode,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();
        for (call, action) in execution.actions().iter().enumerate() {
            let checkpoint = state.checkpoint();
            match self.execute_call(state, principal, action) {
                Ok(data) => {
                    state.commit(checkpoint)?;
                    outcome.results.push(CallResult::ok(data));
                }
                Err(reason) => {
                    state.revert(checkpoint)?;
                    if mode == ExecutionMode::Default {
                        return Err(DispatchError::CallFailed { call, reason });
                    }
                    outcome.results.push(CallResult::failed(&reason));
                }
            }
        }
        Ok(outcome)
    }
}
