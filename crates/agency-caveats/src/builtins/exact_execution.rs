//! Pins a delegation to one exact call

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::decode_action;
use agency_core::{Execution, PrincipalId};

/// Terms: `encode_action` of the only permitted single call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactExecution;

impl ExactExecution {
    /// Enforcer name
    pub const NAME: &'static str = "exact_execution";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for ExactExecution {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let expected = decode_action(input.terms)?;
        match input.execution {
            Execution::Single(action) if *action == expected => Ok(()),
            Execution::Single(_) => Err(CaveatError::new("invalid-execution")),
            Execution::Batch(_) => Err(CaveatError::new("invalid-call-type")),
        }
    }
}
