//! Restricts which principals may redeem a delegation

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::PrincipalList;
use agency_core::PrincipalId;

/// Terms: concatenated 32-byte redeemer addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Redeemer;

impl Redeemer {
    /// Enforcer name
    pub const NAME: &'static str = "redeemer";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for Redeemer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        if !PrincipalList::parse(input.terms)?.contains(&input.redeemer) {
            return Err(CaveatError::new(format!("unauthorized-redeemer: {}", input.redeemer)));
        }
        Ok(())
    }
}
