//! Cumulative allowance on the value moved under one delegation
//!
//! The spent total is keyed by delegation id and caveat index inside the
//! enforcer's own storage. It advances in the after hook, and only for actions that took
//! effect.

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::decode_u128;
use agency_core::PrincipalId;
use tracing::debug;

/// Terms: 16-byte big-endian allowance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpendingLimit;

impl SpendingLimit {
    /// Enforcer name
    pub const NAME: &'static str = "spending_limit";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }

    /// Amount already spent against this caveat
    pub fn spent(ctx: &HookContext<'_>, input: &HookInput<'_>) -> Result<u128, CaveatError> {
        Ok(ctx.state().get_u128(&input.counter_slot())?)
    }
}

impl CaveatEnforcer for SpendingLimit {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let allowance = decode_u128(input.terms)?;
        let Some(requested) = input.execution.checked_total_value() else {
            return Err(CaveatError::new("allowance-exceeded: requested value overflows"));
        };
        let spent = Self::spent(ctx, input)?;
        match spent.checked_add(requested) {
            Some(total) if total <= allowance => Ok(()),
            _ => Err(CaveatError::new(format!(
                "allowance-exceeded: spent {spent} + requested {requested} > allowance {allowance}"
            ))),
        }
    }

    fn after_hook(
        &self,
        ctx: &mut HookContext<'_>,
        input: &HookInput<'_>,
        action_succeeded: bool,
    ) -> Result<(), CaveatError> {
        if !action_succeeded {
            return Ok(());
        }
        let spent = Self::spent(ctx, input)?;
        let spent = input
            .execution
            .checked_total_value()
            .and_then(|requested| spent.checked_add(requested))
            .ok_or_else(|| CaveatError::new("allowance-overflow"))?;
        ctx.state_mut().set_u128(&input.counter_slot(), spent);
        debug!(
            delegation = %input.delegation_id,
            caveat = input.caveat_index,
            spent,
            "Spending limit advanced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::{call, Harness};
    use crate::enforcer::counter_slot;
    use agency_core::{Action, DelegationId, Execution, Hash32, PrincipalId};

    fn spent(h: &Harness) -> u128 {
        h.store
            .get_u128(&SpendingLimit::address(), &counter_slot(&h.delegation_id, h.caveat_index))
            .unwrap()
    }

    #[test]
    fn test_spend_accumulates_until_allowance() {
        let mut h = Harness::new();
        let terms = 5u128.to_be_bytes();
        let exec = call("t", 3, &[]);
        let address = SpendingLimit::address();

        h.before(&SpendingLimit, address, &terms, &[], &exec).unwrap();
        h.after(&SpendingLimit, address, &terms, &exec, true).unwrap();
        assert_eq!(spent(&h), 3);

        let err = h.before(&SpendingLimit, address, &terms, &[], &exec).unwrap_err();
        assert!(err.reason.starts_with("allowance-exceeded"));
    }

    #[test]
    fn test_failed_action_does_not_advance() {
        let mut h = Harness::new();
        let terms = 5u128.to_be_bytes();
        let exec = call("t", 3, &[]);
        h.after(&SpendingLimit, SpendingLimit::address(), &terms, &exec, false).unwrap();
        assert_eq!(spent(&h), 0);
    }

    #[test]
    fn test_counters_are_per_delegation() {
        let mut h = Harness::new();
        let terms = 5u128.to_be_bytes();
        let exec = call("t", 5, &[]);
        let address = SpendingLimit::address();
        h.after(&SpendingLimit, address, &terms, &exec, true).unwrap();

        h.delegation_id = DelegationId(Hash32([2; 32]));
        assert!(h.before(&SpendingLimit, address, &terms, &[], &exec).is_ok());
    }

    #[test]
    fn test_overflowing_request_is_rejected() {
        let mut h = Harness::new();
        let terms = u128::MAX.to_be_bytes();
        let address = SpendingLimit::address();
        h.after(&SpendingLimit, address, &terms, &call("t", 1, &[]), true).unwrap();
        assert!(h.before(&SpendingLimit, address, &terms, &[], &call("t", u128::MAX, &[])).is_err());
    }

    #[test]
    fn test_sibling_caveats_keep_separate_totals() {
        let mut h = Harness::new();
        let address = SpendingLimit::address();
        let tight = 1_000u128.to_be_bytes();
        let loose = 2_000u128.to_be_bytes();

        let first = call("t", 600, &[]);
        for (index, terms) in [(0, &tight), (1, &loose)] {
            h.caveat_index = index;
            h.before(&SpendingLimit, address, terms, &[], &first).unwrap();
        }
        for (index, terms) in [(1, &loose), (0, &tight)] {
            h.caveat_index = index;
            h.after(&SpendingLimit, address, terms, &first, true).unwrap();
        }

        h.caveat_index = 0;
        assert_eq!(spent(&h), 600);
        h.caveat_index = 1;
        assert_eq!(spent(&h), 600);

        let second = call("t", 500, &[]);
        h.caveat_index = 0;
        let err = h.before(&SpendingLimit, address, &tight, &[], &second).unwrap_err();
        assert_eq!(err.reason, "allowance-exceeded: spent 600 + requested 500 > allowance 1000");
        h.caveat_index = 1;
        assert!(h.before(&SpendingLimit, address, &loose, &[], &second).is_ok());
    }

    #[test]
    fn test_batch_value_overflow_is_rejected() {
        let mut h = Harness::new();
        let terms = u128::MAX.to_be_bytes();
        let batch = Execution::Batch(vec![
            Action::new(PrincipalId::derive("a"), u128::MAX, Vec::new()),
            Action::new(PrincipalId::derive("b"), 1, Vec::new()),
        ]);
        let err = h
            .before(&SpendingLimit, SpendingLimit::address(), &terms, &[], &batch)
            .unwrap_err();
        assert_eq!(err.reason, "allowance-exceeded: requested value overflows");
        assert!(h
            .after(&SpendingLimit, SpendingLimit::address(), &terms, &batch, true)
            .is_err());
        assert_eq!(spent(&h), 0);
    }
}
