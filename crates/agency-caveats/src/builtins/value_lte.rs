//! Caps the value attached to each call

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::decode_u128;
use agency_core::PrincipalId;

/// Terms: 16-byte big-endian maximum value per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueLte;

impl ValueLte {
    /// Enforcer name
    pub const NAME: &'static str = "value_lte";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for ValueLte {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let max = decode_u128(input.terms)?;
        if let Some(action) = input.execution.actions().iter().find(|a| a.value > max) {
            return Err(CaveatError::new(format!("value-too-high: {} > {max}", action.value)));
        }
        Ok(())
    }
}
