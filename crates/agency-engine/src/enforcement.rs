//! Caveat hook ordering
//!
//! A [`HookPlan`] lists the caveats of a validated chain in before-hook
//! order: root-most delegation first, caveats in declared order. After
//! hooks run the same list reversed, which is redeemer-most delegation
//! first with caveats in reverse declared order.

use agency_caveats::{CaveatEnforcer, EnforcerRegistry, HookContext, HookInput};
use agency_core::{
    AgencyError, AgencyResult, DelegationId, Execution, ExecutionMode, HookPhase, PrincipalId,
    ScopedState, StateStore,
};
use agency_delegation::{Caveat, Delegation, ValidatedChain};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
struct PlannedHook<'c> {
    caveat: &'c Caveat,
    enforcer: Arc<dyn CaveatEnforcer>,
    delegation_id: DelegationId,
    caveat_index: usize,
    delegator: PrincipalId,
}

/// Resolved caveat hooks for one batch item.
#[derive(Debug)]
pub struct HookPlan<'c> {
    hooks: Vec<PlannedHook<'c>>,
    redeemer: PrincipalId,
    mode: ExecutionMode,
}

impl<'c> HookPlan<'c> {
    /// Resolve every caveat's enforcer. Fails with `UnknownEnforcer` before any hook runs.
    pub fn build(
        enforcers: &EnforcerRegistry,
        chain: &'c [Delegation],
        validated: &ValidatedChain,
        mode: ExecutionMode,
    ) -> AgencyResult<Self> {
        let total = chain.iter().map(|d| d.caveats.len()).sum();
        let mut hooks = Vec::with_capacity(total);
        for (delegation, id) in chain.iter().zip(&validated.ids).rev() {
            for (caveat_index, caveat) in delegation.caveats.iter().enumerate() {
                hooks.push(PlannedHook {
                    caveat,
                    enforcer: enforcers.resolve(&caveat.enforcer)?,
                    delegation_id: *id,
                    caveat_index,
                    delegator: delegation.delegator,
                });
            }
        }
        Ok(Self {
            hooks,
            redeemer: validated.redeemer,
            mode,
        })
    }

    /// Number of caveats in the plan
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the chain carries no caveats
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every before hook in order; the first failure aborts.
    pub fn run_before(&self, state: &mut StateStore, now: u64, execution: &Execution) -> AgencyResult<()> {
        for hook in &self.hooks {
            let input = self.input(hook, execution);
            let mut ctx = HookContext::new(now, ScopedState::new(hook.caveat.enforcer, state));
            hook.enforcer
                .before_hook(&mut ctx, &input)
                .map_err(|e| violation(hook, HookPhase::Before, e.reason))?;
        }
        debug!(hooks = self.hooks.len(), "Before hooks passed");
        Ok(())
    }

    /// Run every after hook in reverse order; the first failure aborts.
    pub fn run_after(
        &self,
        state: &mut StateStore,
        now: u64,
        execution: &Execution,
        action_succeeded: bool,
    ) -> AgencyResult<()> {
        for hook in self.hooks.iter().rev() {
            let input = self.input(hook, execution);
            let mut ctx = HookContext::new(now, ScopedState::new(hook.caveat.enforcer, state));
            hook.enforcer
                .after_hook(&mut ctx, &input, action_succeeded)
                .map_err(|e| violation(hook, HookPhase::After, e.reason))?;
        }
        debug!(hooks = self.hooks.len(), action_succeeded, "After hooks passed");
        Ok(())
    }

    fn input<'a>(&self, hook: &'a PlannedHook<'c>, execution: &'a Execution) -> HookInput<'a> {
        HookInput {
            terms: &hook.caveat.terms,
            args: &hook.caveat.args,
            mode: self.mode,
            execution,
            delegation_id: hook.delegation_id,
            caveat_index: hook.caveat_index,
            delegator: hook.delegator,
            redeemer: self.redeemer,
        }
    }
}

fn violation(hook: &PlannedHook<'_>, phase: HookPhase, reason: String) -> AgencyError {
    warn!(
        enforcer = %hook.caveat.enforcer,
        name = hook.enforcer.name(),
        delegation = %hook.delegation_id,
        %phase,
        reason = %reason,
        "Caveat rejected redemption"
    );
    AgencyError::CaveatViolation {
        enforcer: hook.caveat.enforcer,
        delegation: hook.delegation_id,
        phase,
        reason,
    }
}
