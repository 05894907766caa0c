//! Test enforcers: a recorder for hook ordering and a configurable failure

use agency_caveats::{CaveatEnforcer, CaveatError, HookContext, HookInput};
use agency_core::{DelegationId, HookPhase};
use parking_lot::Mutex;
use std::sync::Arc;

/// One observed hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookRecord {
    /// Phase of the hook
    pub phase: HookPhase,
    /// Terms of the caveat, used as a label
    pub label: Vec<u8>,
    /// Delegation the caveat belongs to
    pub delegation_id: DelegationId,
    /// `action_succeeded` for after hooks
    pub action_succeeded: Option<bool>,
}

/// Enforcer that records every hook call and accepts.
#[derive(Debug, Clone, Default)]
pub struct RecordingEnforcer {
    records: Arc<Mutex<Vec<HookRecord>>>,
}

impl RecordingEnforcer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records so far
    pub fn records(&self) -> Vec<HookRecord> {
        self.records.lock().clone()
    }

    /// `(phase, label)` pairs as strings, in call order
    pub fn order(&self) -> Vec<(HookPhase, String)> {
        self.records
            .lock()
            .iter()
            .map(|r| (r.phase, String::from_utf8_lossy(&r.label).into_owned()))
            .collect()
    }

    /// Forget every record
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, phase: HookPhase, input: &HookInput<'_>, action_succeeded: Option<bool>) {
        self.records.lock().push(HookRecord {
            phase,
            label: input.terms.to_vec(),
            delegation_id: input.delegation_id,
            action_succeeded,
        });
    }
}

impl CaveatEnforcer for RecordingEnforcer {
    fn name(&self) -> &str {
        "recording"
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        self.push(HookPhase::Before, input, None);
        Ok(())
    }

    fn after_hook(
        &self,
        _ctx: &mut HookContext<'_>,
        input: &HookInput<'_>,
        action_succeeded: bool,
    ) -> Result<(), CaveatError> {
        self.push(HookPhase::After, input, Some(action_succeeded));
        Ok(())
    }
}

/// Enforcer that fails in one phase with a fixed reason.
#[derive(Debug, Clone)]
pub struct FailingEnforcer {
    phase: HookPhase,
    reason: String,
}

impl FailingEnforcer {
    /// Fail in `phase` with `reason`
    pub fn new(phase: HookPhase, reason: impl Into<String>) -> Self {
        Self {
            phase,
            reason: reason.into(),
        }
    }
}

impl CaveatEnforcer for FailingEnforcer {
    fn name(&self) -> &str {
        "failing"
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, _input: &HookInput<'_>) -> Result<(), CaveatError> {
        if self.phase == HookPhase::Before {
            return Err(CaveatError::new(self.reason.clone()));
        }
        Ok(())
    }

    fn after_hook(
        &self,
        _ctx: &mut HookContext<'_>,
        _input: &HookInput<'_>,
        _action_succeeded: bool,
    ) -> Result<(), CaveatError> {
        if self.phase == HookPhase::After {
            return Err(CaveatError::new(self.reason.clone()));
        }
        Ok(())
    }
}
