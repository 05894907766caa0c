//! Unified error system for Agency
//!
//! One error type crosses every crate boundary. Each variant belongs to exactly
//! one [`ErrorCategory`], which downstream tooling uses to tell malformed
//! requests, broken chains, authorization failures, policy rejections and
//! administrative refusals apart.

use crate::identifiers::{DelegationId, PrincipalId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed request shape, rejected before any state change
    Shape,
    /// Broken link, wrong delegate, missing or misplaced root
    ChainIntegrity,
    /// Bad or missing signature, disabled grant, registry guard
    Authorization,
    /// A caveat hook rejected the redemption
    Policy,
    /// Paused engine or unauthorized administrative call
    Administrative,
    /// The guarded action failed in default execution mode
    Dispatch,
    /// Serialization or configuration problems
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Shape => "shape",
            ErrorCategory::ChainIntegrity => "chain-integrity",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Policy => "policy",
            ErrorCategory::Administrative => "administrative",
            ErrorCategory::Dispatch => "dispatch",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Which side of the guarded action a caveat hook ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPhase {
    /// Runs before dispatch, root-most delegation first
    Before,
    /// Runs after dispatch, redeemer-most delegation first
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Before => f.write_str("before"),
            HookPhase::After => f.write_str("after"),
        }
    }
}

/// Unified error type for all Agency operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AgencyError {
    /// Positional batch arrays differ in length
    #[error("batch data length mismatch: {chains} chains, {modes} modes, {executions} executions")]
    BatchDataLengthMismatch {
        /// Number of delegation chains supplied
        chains: usize,
        /// Number of execution modes supplied
        modes: usize,
        /// Number of executions supplied
        executions: usize,
    },

    /// Delegation chain exceeds the configured bound
    #[error("delegation chain of length {length} exceeds maximum {max}")]
    ChainTooLong {
        /// Supplied chain length
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Batch exceeds the configured bound
    #[error("batch of {size} items exceeds maximum {max}")]
    BatchTooLarge {
        /// Supplied batch size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// A batch execution carried no calls
    #[error("execution at batch index {index} contains no calls")]
    EmptyExecution {
        /// Batch index of the offending item
        index: usize,
    },

    /// First delegation is not issued to the redeemer
    #[error("invalid delegate at chain index {index}")]
    InvalidDelegate {
        /// Chain index of the offending delegation
        index: usize,
    },

    /// Authority link to the parent (or to root) does not hold
    #[error("invalid authority at chain index {index}")]
    InvalidAuthority {
        /// Chain index of the offending delegation
        index: usize,
    },

    /// Caller is not the delegator of the delegation it tried to manage
    #[error("caller {caller} is not the delegator {expected}")]
    InvalidDelegator {
        /// Delegator recorded in the delegation
        expected: PrincipalId,
        /// Caller that attempted the operation
        caller: PrincipalId,
    },

    /// Signature did not verify against the delegator
    #[error("invalid signature at chain index {index}: {reason}")]
    InvalidSignature {
        /// Chain index of the offending delegation
        index: usize,
        /// Verifier diagnostic
        reason: String,
    },

    /// Signature is empty and the delegation was never approved on-engine
    #[error("empty signature at chain index {index} for a delegation that is not approved on-engine")]
    EmptySignature {
        /// Chain index of the offending delegation
        index: usize,
    },

    /// Delegation has been disabled by its delegator
    #[error("cannot use disabled delegation {id} at chain index {index}")]
    CannotUseADisabledDelegation {
        /// Chain index of the offending delegation
        index: usize,
        /// Identifier of the disabled delegation
        id: DelegationId,
    },

    /// Delegation is already disabled
    #[error("delegation {id} is already disabled")]
    AlreadyDisabled {
        /// Identifier of the delegation
        id: DelegationId,
    },

    /// Delegation is already enabled
    #[error("delegation {id} is already enabled")]
    AlreadyEnabled {
        /// Identifier of the delegation
        id: DelegationId,
    },

    /// Delegation is already approved on-engine
    #[error("delegation {id} is already approved")]
    AlreadyApproved {
        /// Identifier of the delegation
        id: DelegationId,
    },

    /// A caveat hook rejected the redemption
    #[error("caveat {enforcer} rejected {delegation} in {phase} hook: {reason}")]
    CaveatViolation {
        /// Enforcer that raised the failure
        enforcer: PrincipalId,
        /// Delegation the caveat belongs to
        delegation: DelegationId,
        /// Hook phase that failed
        phase: HookPhase,
        /// Enforcer's own diagnostic
        reason: String,
    },

    /// No enforcer is registered at the referenced address
    #[error("no caveat enforcer registered at {enforcer}")]
    UnknownEnforcer {
        /// Referenced enforcer address
        enforcer: PrincipalId,
    },

    /// Engine is paused
    #[error("engine is paused")]
    Paused,

    /// Unpause requested while not paused
    #[error("engine is not paused")]
    NotPaused,

    /// Caller lacks administrative rights
    #[error("caller {caller} is not authorized")]
    Unauthorized {
        /// Rejected caller
        caller: PrincipalId,
    },

    /// Ownership acceptance without a pending transfer
    #[error("no ownership transfer is pending")]
    NoPendingOwner,

    /// Guarded action failed under default execution mode
    #[error("action failed at batch index {index}: {reason}")]
    ActionFailed {
        /// Batch index of the failing item
        index: usize,
        /// Dispatcher diagnostic
        reason: String,
    },

    /// Encoding or decoding failure
    #[error("serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// State checkpoint misuse or malformed stored value
    #[error("state error: {message}")]
    State {
        /// Error message describing the state failure
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl AgencyError {
    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BatchDataLengthMismatch { .. }
            | Self::ChainTooLong { .. }
            | Self::BatchTooLarge { .. }
            | Self::EmptyExecution { .. } => ErrorCategory::Shape,
            Self::InvalidDelegate { .. }
            | Self::InvalidAuthority { .. }
            | Self::InvalidDelegator { .. } => ErrorCategory::ChainIntegrity,
            Self::InvalidSignature { .. }
            | Self::EmptySignature { .. }
            | Self::CannotUseADisabledDelegation { .. }
            | Self::AlreadyDisabled { .. }
            | Self::AlreadyEnabled { .. }
            | Self::AlreadyApproved { .. } => ErrorCategory::Authorization,
            Self::CaveatViolation { .. } | Self::UnknownEnforcer { .. } => ErrorCategory::Policy,
            Self::Paused | Self::NotPaused | Self::Unauthorized { .. } | Self::NoPendingOwner => {
                ErrorCategory::Administrative
            }
            Self::ActionFailed { .. } => ErrorCategory::Dispatch,
            Self::Serialization { .. } | Self::State { .. } | Self::Config { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Standard Result type for Agency operations
pub type Result<T> = std::result::Result<T, AgencyError>;

impl From<crate::state::StateError> for AgencyError {
    fn from(err: crate::state::StateError) -> Self {
        Self::State {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AgencyError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<toml::de::Error> for AgencyError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
