//! Restricts every call to a listed set of targets

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::PrincipalList;
use agency_core::PrincipalId;

/// Terms: concatenated 32-byte target addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedTargets;

impl AllowedTargets {
    /// Enforcer name
    pub const NAME: &'static str = "allowed_targets";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for AllowedTargets {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let allowed = PrincipalList::parse(input.terms)?;
        for action in input.execution.actions() {
            if !allowed.contains(&action.target) {
                return Err(CaveatError::new(format!("target-address-not-allowed: {}", action.target)));
            }
        }
        Ok(())
    }
}
