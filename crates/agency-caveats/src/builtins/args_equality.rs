//! Requires the redeemer's args to equal the signed terms

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use agency_core::PrincipalId;

/// Terms: arbitrary bytes the args must reproduce.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgsEqualityCheck;

impl ArgsEqualityCheck {
    /// Enforcer name
    pub const NAME: &'static str = "args_equality_check";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for ArgsEqualityCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        if input.args != input.terms {
            return Err(CaveatError::new("different-args-and-terms"));
        }
        Ok(())
    }
}
