//! Built-in caveat enforcers
//!
//! Each enforcer is registered at `enforcer_address(NAME)` by
//! [`crate::EnforcerRegistry::with_builtins`].

mod allowed_methods;
mod allowed_targets;
mod args_equality;
mod exact_execution;
mod limited_calls;
mod redeemer;
mod spending_limit;
mod timestamp;
mod value_lte;

pub use allowed_methods::AllowedMethods;
pub use allowed_targets::AllowedTargets;
pub use args_equality::ArgsEqualityCheck;
pub use exact_execution::ExactExecution;
pub use limited_calls::LimitedCalls;
pub use redeemer::Redeemer;
pub use spending_limit::SpendingLimit;
pub use timestamp::Timestamp;
pub use value_lte::ValueLte;

use crate::enforcer::CaveatEnforcer;
use agency_core::PrincipalId;
use std::sync::Arc;

/// Every built-in with its well-known address.
pub fn all() -> Vec<(PrincipalId, Arc<dyn CaveatEnforcer>)> {
    vec![
        (AllowedTargets::address(), Arc::new(AllowedTargets) as Arc<dyn CaveatEnforcer>),
        (AllowedMethods::address(), Arc::new(AllowedMethods)),
        (ValueLte::address(), Arc::new(ValueLte)),
        (SpendingLimit::address(), Arc::new(SpendingLimit)),
        (LimitedCalls::address(), Arc::new(LimitedCalls)),
        (Timestamp::address(), Arc::new(Timestamp)),
        (Redeemer::address(), Arc::new(Redeemer)),
        (ArgsEqualityCheck::address(), Arc::new(ArgsEqualityCheck)),
        (ExactExecution::address(), Arc::new(ExactExecution)),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::enforcer::{CaveatEnforcer, CaveatError, HookContext, HookInput};
    use agency_core::{
        Action, DelegationId, Execution, ExecutionMode, Hash32, PrincipalId, ScopedState, StateStore,
    };

    /// Drives one enforcer's hooks against a private store.
    pub struct Harness {
        pub store: StateStore,
        pub now: u64,
        pub delegation_id: DelegationId,
        pub caveat_index: usize,
        pub redeemer: PrincipalId,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                store: StateStore::new(),
                now: 1_000,
                delegation_id: DelegationId(Hash32([1; 32])),
                caveat_index: 0,
                redeemer: PrincipalId::derive("redeemer"),
            }
        }

        fn input<'a>(&self, terms: &'a [u8], args: &'a [u8], execution: &'a Execution) -> HookInput<'a> {
            HookInput {
                terms,
                args,
                mode: ExecutionMode::Default,
                execution,
                delegation_id: self.delegation_id,
                caveat_index: self.caveat_index,
                delegator: PrincipalId::derive("delegator"),
                redeemer: self.redeemer,
            }
        }

        pub fn before(
            &mut self,
            enforcer: &dyn CaveatEnforcer,
            address: PrincipalId,
            terms: &[u8],
            args: &[u8],
            execution: &Execution,
        ) -> Result<(), CaveatError> {
            let input = self.input(terms, args, execution);
            let mut ctx = HookContext::new(self.now, ScopedState::new(address, &mut self.store));
            enforcer.before_hook(&mut ctx, &input)
        }

        pub fn after(
            &mut self,
            enforcer: &dyn CaveatEnforcer,
            address: PrincipalId,
            terms: &[u8],
            execution: &Execution,
            succeeded: bool,
        ) -> Result<(), CaveatError> {
            let input = self.input(terms, &[], execution);
            let mut ctx = HookContext::new(self.now, ScopedState::new(address, &mut self.store));
            enforcer.after_hook(&mut ctx, &input, succeeded)
        }
    }

    pub fn call(target: &str, value: u128, payload: &[u8]) -> Execution {
        Execution::Single(Action::new(PrincipalId::derive(target), value, payload.to_vec()))
    }
}
