//! Caveat enforcer protocol
//!
//! An enforcer is policy code addressed by a principal. The engine calls its
//! `before_hook` ahead of the guarded action and its `after_hook` once the
//! action has been dispatched. A hook that returns an error is fatal to the
//! batch item in every execution mode.
//!
//! # Cost contract
//!
//! Hooks must run in time linear in `terms.len() + execution.len()`. Terms
//! are decoded in a single pass; duplicate entries are legal and only add
//! linear cost. The helpers in [`crate::terms`] follow this contract.
//!
//! # State
//!
//! [`HookContext`] exposes storage scoped to the enforcer's own address and
//! nothing else. Counting enforcers must mutate state only in `after_hook`
//! and only when `action_succeeded` is true.

use agency_core::{
    AgencyError, AgencyResult, DelegationId, Execution, ExecutionMode, PrincipalId, ScopedState,
    StateError,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Rejection raised by an enforcer, carrying its own diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct CaveatError {
    /// Enforcer-defined reason
    pub reason: String,
}

impl CaveatError {
    /// Create a caveat error
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<StateError> for CaveatError {
    fn from(err: StateError) -> Self {
        Self::new(format!("enforcer state: {err}"))
    }
}

/// Everything a hook may inspect about the caveat and the guarded action.
#[derive(Debug, Clone, Copy)]
pub struct HookInput<'a> {
    /// Delegator-signed terms
    pub terms: &'a [u8],
    /// Redeemer-supplied args; never delegator-authorized
    pub args: &'a [u8],
    /// Execution mode of the batch item
    pub mode: ExecutionMode,
    /// Guarded calls
    pub execution: &'a Execution,
    /// Delegation the caveat is attached to
    pub delegation_id: DelegationId,
    /// Position of the caveat within that delegation
    pub caveat_index: usize,
    /// Delegator of that delegation
    pub delegator: PrincipalId,
    /// Principal redeeming the chain
    pub redeemer: PrincipalId,
}

impl HookInput<'_> {
    /// Storage slot private to this caveat instance
    pub fn counter_slot(&self) -> [u8; 40] {
        counter_slot(&self.delegation_id, self.caveat_index)
    }
}

/// Slot key for per-caveat counters: delegation id followed by the
/// big-endian caveat index. Two caveats on one delegation never share it.
pub fn counter_slot(delegation: &DelegationId, caveat_index: usize) -> [u8; 40] {
    let mut slot = [0u8; 40];
    slot[..32].copy_from_slice(delegation.as_bytes());
    slot[32..].copy_from_slice(&(caveat_index as u64).to_be_bytes());
    slot
}

/// Runtime context of one hook invocation.
pub struct HookContext<'a> {
    now: u64,
    state: ScopedState<'a>,
}

impl<'a> HookContext<'a> {
    /// Create a context over the enforcer's own slots
    pub fn new(now: u64, state: ScopedState<'a>) -> Self {
        Self { now, state }
    }

    /// Unix time sampled once for the whole redemption call
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Enforcer-owned storage
    pub fn state(&self) -> &ScopedState<'a> {
        &self.state
    }

    /// Mutable enforcer-owned storage
    pub fn state_mut(&mut self) -> &mut ScopedState<'a> {
        &mut self.state
    }
}

impl fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("now", &self.now)
            .field("owner", &self.state.owner())
            .finish()
    }
}

/// Policy code attached to delegations through caveats.
pub trait CaveatEnforcer: Send + Sync + fmt::Debug {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Runs before the guarded action.
    fn before_hook(&self, _ctx: &mut HookContext<'_>, _input: &HookInput<'_>) -> Result<(), CaveatError> {
        Ok(())
    }

    /// Runs after the guarded action was dispatched.
    fn after_hook(
        &self,
        _ctx: &mut HookContext<'_>,
        _input: &HookInput<'_>,
        _action_succeeded: bool,
    ) -> Result<(), CaveatError> {
        Ok(())
    }
}

/// Well-known address of a built-in enforcer.
pub fn enforcer_address(name: &str) -> PrincipalId {
    PrincipalId::derive(&format!("agency.enforcer.{name}"))
}

/// Enforcer address → implementation.
#[derive(Debug, Clone, Default)]
pub struct EnforcerRegistry {
    enforcers: HashMap<PrincipalId, Arc<dyn CaveatEnforcer>>,
}

impl EnforcerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in enforcer at its well-known address
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (address, enforcer) in crate::builtins::all() {
            registry.register(address, enforcer);
        }
        registry
    }

    /// Register (or replace) the enforcer at `address`
    pub fn register(&mut self, address: PrincipalId, enforcer: Arc<dyn CaveatEnforcer>) {
        debug!(enforcer = %address, name = enforcer.name(), "Registering caveat enforcer");
        self.enforcers.insert(address, enforcer);
    }

    /// Look up an enforcer
    pub fn get(&self, address: &PrincipalId) -> Option<Arc<dyn CaveatEnforcer>> {
        self.enforcers.get(address).cloned()
    }

    /// Look up an enforcer, failing with `UnknownEnforcer`
    pub fn resolve(&self, address: &PrincipalId) -> AgencyResult<Arc<dyn CaveatEnforcer>> {
        self.get(address)
            .ok_or(AgencyError::UnknownEnforcer { enforcer: *address })
    }

    /// Whether an enforcer is registered at `address`
    pub fn contains(&self, address: &PrincipalId) -> bool {
        self.enforcers.contains_key(address)
    }

    /// Number of registered enforcers
    pub fn len(&self) -> usize {
        self.enforcers.len()
    }

    /// Whether no enforcer is registered
    pub fn is_empty(&self) -> bool {
        self.enforcers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{AllowedTargets, SpendingLimit};
    use agency_core::StateStore;
    use assert_matches::assert_matches;

    #[derive(Debug)]
    struct Noop;

    impl CaveatEnforcer for Noop {
        fn name(&self) -> &str {
            "noop"
        }
    }

    #[test]
    fn test_builtins_live_at_well_known_addresses() {
        let registry = EnforcerRegistry::with_builtins();
        assert_eq!(registry.len(), 9);
        assert!(registry.contains(&AllowedTargets::address()));
        assert_eq!(
            registry.resolve(&SpendingLimit::address()).unwrap().name(),
            SpendingLimit::NAME
        );
    }

    #[test]
    fn test_unknown_enforcer() {
        let registry = EnforcerRegistry::new();
        let address = PrincipalId::derive("nowhere");
        assert_matches!(
            registry.resolve(&address),
            Err(AgencyError::UnknownEnforcer { enforcer }) if enforcer == address
        );
    }

    #[test]
    fn test_default_hooks_accept() {
        let mut store = StateStore::new();
        let owner = PrincipalId::derive("noop");
        let mut ctx = HookContext::new(0, ScopedState::new(owner, &mut store));
        let execution = Execution::Batch(Vec::new());
        let input = HookInput {
            terms: &[],
            args: &[],
            mode: ExecutionMode::Default,
            execution: &execution,
            delegation_id: DelegationId(agency_core::Hash32::ZERO),
            caveat_index: 0,
            delegator: owner,
            redeemer: owner,
        };
        assert!(Noop.before_hook(&mut ctx, &input).is_ok());
        assert!(Noop.after_hook(&mut ctx, &input, false).is_ok());
        assert_eq!(ctx.state().owner(), owner);
    }
}
