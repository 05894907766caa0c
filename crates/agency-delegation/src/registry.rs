//! Revocation and on-engine approval state
//!
//! Both sets are keyed by delegation identifier. Only the delegator recorded
//! in a delegation may change its entries; the registry stores no separate
//! ownership record.

use crate::delegation::Delegation;
use agency_core::{AgencyError, AgencyResult, DelegationId, PrincipalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Disabled and approved delegation identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRegistry {
    disabled: BTreeSet<DelegationId>,
    approved: BTreeSet<DelegationId>,
}

impl DelegationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_delegator(delegation: &Delegation, caller: &PrincipalId) -> AgencyResult<()> {
        if delegation.delegator != *caller {
            return Err(AgencyError::InvalidDelegator {
                expected: delegation.delegator,
                caller: *caller,
            });
        }
        Ok(())
    }

    /// Register a delegation on-engine so it can be redeemed without a signature.
    pub fn approve(&mut self, delegation: &Delegation, caller: &PrincipalId) -> AgencyResult<DelegationId> {
        Self::ensure_delegator(delegation, caller)?;
        let id = delegation.id();
        if !self.approved.insert(id) {
            return Err(AgencyError::AlreadyApproved { id });
        }
        debug!(delegation = %id, delegator = %caller, "Delegation approved on-engine");
        Ok(id)
    }

    /// Mark a delegation disabled.
    pub fn disable(&mut self, delegation: &Delegation, caller: &PrincipalId) -> AgencyResult<DelegationId> {
        Self::ensure_delegator(delegation, caller)?;
        let id = delegation.id();
        if !self.disabled.insert(id) {
            return Err(AgencyError::AlreadyDisabled { id });
        }
        debug!(delegation = %id, delegator = %caller, "Delegation disabled");
        Ok(id)
    }

    /// Clear a delegation's disabled mark.
    pub fn enable(&mut self, delegation: &Delegation, caller: &PrincipalId) -> AgencyResult<DelegationId> {
        Self::ensure_delegator(delegation, caller)?;
        let id = delegation.id();
        if !self.disabled.remove(&id) {
            return Err(AgencyError::AlreadyEnabled { id });
        }
        debug!(delegation = %id, delegator = %caller, "Delegation enabled");
        Ok(id)
    }

    /// Whether the delegation is currently disabled
    pub fn is_disabled(&self, id: &DelegationId) -> bool {
        self.disabled.contains(id)
    }

    /// Whether the delegation was approved on-engine
    pub fn is_approved(&self, id: &DelegationId) -> bool {
        self.approved.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::{Authority, Delegate};
    use assert_matches::assert_matches;

    fn grant() -> Delegation {
        Delegation {
            delegate: Delegate::Principal(PrincipalId::derive("bob")),
            delegator: PrincipalId::derive("alice"),
            authority: Authority::Root,
            caveats: Vec::new(),
            salt: 0,
            signature: Vec::new(),
        }
    }

    #[test]
    fn test_disable_enable_cycle() {
        let mut registry = DelegationRegistry::new();
        let d = grant();
        let alice = d.delegator;

        let id = registry.disable(&d, &alice).unwrap();
        assert!(registry.is_disabled(&id));
        assert_matches!(registry.disable(&d, &alice), Err(AgencyError::AlreadyDisabled { .. }));

        registry.enable(&d, &alice).unwrap();
        assert!(!registry.is_disabled(&id));
        assert_matches!(registry.enable(&d, &alice), Err(AgencyError::AlreadyEnabled { .. }));

        // Re-disabling after enable is allowed any number of times.
        registry.disable(&d, &alice).unwrap();
        assert!(registry.is_disabled(&id));
    }

    #[test]
    fn test_only_delegator_may_manage() {
        let mut registry = DelegationRegistry::new();
        let d = grant();
        let bob = PrincipalId::derive("bob");

        assert_matches!(
            registry.disable(&d, &bob),
            Err(AgencyError::InvalidDelegator { expected, caller }) if expected == d.delegator && caller == bob
        );
        assert_matches!(registry.approve(&d, &bob), Err(AgencyError::InvalidDelegator { .. }));
        assert!(!registry.is_disabled(&d.id()));
    }

    #[test]
    fn test_approve_twice_fails() {
        let mut registry = DelegationRegistry::new();
        let d = grant();
        let id = registry.approve(&d, &d.delegator).unwrap();
        assert!(registry.is_approved(&id));
        assert_matches!(
            registry.approve(&d, &d.delegator),
            Err(AgencyError::AlreadyApproved { id: dup }) if dup == id
        );
    }

    #[test]
    fn test_state_is_keyed_by_terms_not_signature() {
        let mut registry = DelegationRegistry::new();
        let d = grant();
        registry.disable(&d, &d.delegator).unwrap();

        let mut resigned = grant();
        resigned.signature = vec![1; 64];
        assert!(registry.is_disabled(&resigned.id()));
    }
}
