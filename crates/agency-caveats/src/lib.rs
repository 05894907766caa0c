//! Agency Caveats - policy plugins evaluated around guarded actions
//!
//! Caveats attach an enforcer address and signed terms to a delegation. The
//! engine resolves the address through an [`EnforcerRegistry`] and invokes the
//! enforcer's hooks before and after the guarded action.

#![forbid(unsafe_code)]

/// Built-in enforcers
pub mod builtins;

/// Enforcer trait, hook context and registry
pub mod enforcer;

/// Linear-cost terms decoding
pub mod terms;

pub use builtins::{
    AllowedMethods, AllowedTargets, ArgsEqualityCheck, ExactExecution, LimitedCalls, Redeemer,
    SpendingLimit, Timestamp, ValueLte,
};
pub use enforcer::{
    counter_slot, enforcer_address, CaveatEnforcer, CaveatError, EnforcerRegistry, HookContext,
    HookInput,
};
pub use terms::{encode_action, PrincipalList, SelectorList};
