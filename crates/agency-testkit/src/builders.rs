//! Delegation and caveat builders

use crate::keys::KeyTestFixture;
use agency_caveats::{
    encode_action, AllowedMethods, AllowedTargets, ArgsEqualityCheck, ExactExecution, LimitedCalls,
    PrincipalList, Redeemer, SpendingLimit, Timestamp, ValueLte,
};
use agency_core::{Action, DomainSeparator, PrincipalId};
use agency_delegation::{Authority, Caveat, Delegate, Delegation};

/// Fluent builder for delegations.
#[derive(Debug, Clone)]
pub struct DelegationBuilder {
    delegation: Delegation,
}

impl DelegationBuilder {
    /// Root grant from `delegator`, open to any delegate until `to` is called
    pub fn root(delegator: PrincipalId) -> Self {
        Self {
            delegation: Delegation {
                delegate: Delegate::Any,
                delegator,
                authority: Authority::Root,
                caveats: Vec::new(),
                salt: 0,
                signature: Vec::new(),
            },
        }
    }

    /// Re-delegation of `parent` by `parent`'s delegate
    pub fn child_of(parent: &Delegation, delegator: PrincipalId) -> Self {
        let mut builder = Self::root(delegator);
        builder.delegation.authority = Authority::Parent(parent.id());
        builder
    }

    /// Restrict the delegate
    pub fn to(mut self, delegate: PrincipalId) -> Self {
        self.delegation.delegate = Delegate::Principal(delegate);
        self
    }

    /// Open the grant to any redeemer
    pub fn to_any(mut self) -> Self {
        self.delegation.delegate = Delegate::Any;
        self
    }

    /// Append a caveat
    pub fn caveat(mut self, caveat: Caveat) -> Self {
        self.delegation.caveats.push(caveat);
        self
    }

    /// Set the salt
    pub fn salt(mut self, salt: u64) -> Self {
        self.delegation.salt = salt;
        self
    }

    /// Finish without a signature
    pub fn unsigned(self) -> Delegation {
        self.delegation
    }

    /// Finish signed by `key` under `domain`
    pub fn sign(self, key: &KeyTestFixture, domain: &DomainSeparator) -> Delegation {
        key.sign_delegation(self.delegation, domain)
    }
}

/// Calls may only target `targets`
pub fn allowed_targets(targets: &[PrincipalId]) -> Caveat {
    Caveat::new(AllowedTargets::address(), PrincipalList::encode(targets))
}

/// Calls may only use `selectors`
pub fn allowed_methods(selectors: &[[u8; 4]]) -> Caveat {
    Caveat::new(AllowedMethods::address(), selectors.concat())
}

/// Per-call value cap
pub fn value_lte(max: u128) -> Caveat {
    Caveat::new(ValueLte::address(), max.to_be_bytes().to_vec())
}

/// Cumulative value allowance
pub fn spending_limit(allowance: u128) -> Caveat {
    Caveat::new(SpendingLimit::address(), allowance.to_be_bytes().to_vec())
}

/// Redemption count limit
pub fn limited_calls(limit: u64) -> Caveat {
    Caveat::new(LimitedCalls::address(), limit.to_be_bytes().to_vec())
}

/// Validity window
pub fn timestamp(not_before: u64, not_after: u64) -> Caveat {
    Caveat::new(Timestamp::address(), Timestamp::terms(not_before, not_after))
}

/// Only `redeemers` may redeem
pub fn redeemer(redeemers: &[PrincipalId]) -> Caveat {
    Caveat::new(Redeemer::address(), PrincipalList::encode(redeemers))
}

/// Args must equal `expected`
pub fn args_equality(expected: &[u8]) -> Caveat {
    Caveat::new(ArgsEqualityCheck::address(), expected.to_vec())
}

/// Only `action` may be executed
pub fn exact_execution(action: &Action) -> Caveat {
    Caveat::new(ExactExecution::address(), encode_action(action))
}
