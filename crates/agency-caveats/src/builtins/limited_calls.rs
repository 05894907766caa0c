//! Caps how many times a delegation may be redeemed

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::decode_u64;
use agency_core::PrincipalId;

/// Terms: 8-byte big-endian redemption limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitedCalls;

impl LimitedCalls {
    /// Enforcer name
    pub const NAME: &'static str = "limited_calls";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }

    fn count(ctx: &HookContext<'_>, input: &HookInput<'_>) -> Result<u128, CaveatError> {
        Ok(ctx.state().get_u128(&input.counter_slot())?)
    }
}

impl CaveatEnforcer for LimitedCalls {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let limit = decode_u64(input.terms)?;
        if Self::count(ctx, input)? >= u128::from(limit) {
            return Err(CaveatError::new("limit-exceeded"));
        }
        Ok(())
    }

    fn after_hook(
        &self,
        ctx: &mut HookContext<'_>,
        input: &HookInput<'_>,
        action_succeeded: bool,
    ) -> Result<(), CaveatError> {
        if action_succeeded {
            let next = Self::count(ctx, input)?.saturating_add(1);
            ctx.state_mut().set_u128(&input.counter_slot(), next);
        }
        Ok(())
    }
}
