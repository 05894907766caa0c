//! Engine events
//!
//! Events produced during a redemption call are buffered and appended to the
//! engine log only if the call commits.

use crate::dispatcher::CallResult;
use agency_core::{DelegationId, PrincipalId};
use agency_delegation::Delegate;
use serde::{Deserialize, Serialize};

/// Observable state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A delegation in a redeemed chain was exercised
    RedeemedDelegation {
        /// Effective grantor of the chain
        root_delegator: PrincipalId,
        /// Principal that redeemed the chain
        redeemer: PrincipalId,
        /// Exercised delegation
        delegation: DelegationId,
    },
    /// A failure-tolerant item's action did not take effect
    TryExecutionFailed {
        /// Batch index of the item
        batch_index: usize,
        /// Effective grantor the action ran for
        root_delegator: PrincipalId,
        /// Per-call results reported by the dispatcher
        results: Vec<CallResult>,
    },
    /// Delegation registered on-engine
    ApprovedDelegation {
        /// Delegation identifier
        id: DelegationId,
        /// Delegator
        delegator: PrincipalId,
        /// Delegate
        delegate: Delegate,
    },
    /// Delegation disabled by its delegator
    DisabledDelegation {
        /// Delegation identifier
        id: DelegationId,
        /// Delegator
        delegator: PrincipalId,
        /// Delegate
        delegate: Delegate,
    },
    /// Delegation re-enabled by its delegator
    EnabledDelegation {
        /// Delegation identifier
        id: DelegationId,
        /// Delegator
        delegator: PrincipalId,
        /// Delegate
        delegate: Delegate,
    },
    /// Engine paused
    Paused {
        /// Owner that paused
        by: PrincipalId,
    },
    /// Engine resumed
    Unpaused {
        /// Owner that resumed
        by: PrincipalId,
    },
    /// Ownership proposed to a new principal
    OwnershipTransferStarted {
        /// Current owner
        previous_owner: PrincipalId,
        /// Proposed owner
        new_owner: PrincipalId,
    },
    /// Ownership accepted
    OwnershipTransferred {
        /// Owner before acceptance
        previous_owner: PrincipalId,
        /// Owner after acceptance
        new_owner: PrincipalId,
    },
}

impl EngineEvent {
    /// Short event name
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::RedeemedDelegation { .. } => "RedeemedDelegation",
            EngineEvent::TryExecutionFailed { .. } => "TryExecutionFailed",
            EngineEvent::ApprovedDelegation { .. } => "ApprovedDelegation",
            EngineEvent::DisabledDelegation { .. } => "DisabledDelegation",
            EngineEvent::EnabledDelegation { .. } => "EnabledDelegation",
            EngineEvent::Paused { .. } => "Paused",
            EngineEvent::Unpaused { .. } => "Unpaused",
            EngineEvent::OwnershipTransferStarted { .. } => "OwnershipTransferStarted",
            EngineEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}
