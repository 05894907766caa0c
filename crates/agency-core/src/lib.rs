//! Agency Core - foundation types for delegation redemption
//!
//! Identifiers, content hashing, domain separation, the guarded action
//! model, journaled state, time sources, configuration and the unified
//! error type. Everything here is synchronous and free of engine policy.

#![forbid(unsafe_code)]

/// Engine configuration
pub mod config;

/// Domain separation for signed digests
pub mod domain;

/// Unified error handling
pub mod errors;

/// Guarded action model
pub mod execution;

/// Pure synchronous hashing
pub mod hash;

/// Principal, delegation and caveat identifiers
pub mod identifiers;

/// Journaled state store
pub mod state;

/// Time sources
pub mod time;

pub use config::EngineConfig;
pub use domain::{DomainParams, DomainSeparator};
pub use errors::{AgencyError, ErrorCategory, HookPhase, Result as AgencyResult};
pub use execution::{Action, CallType, Execution, ExecutionMode};
pub use hash::{CanonicalHasher, Hash32};
pub use identifiers::{CaveatHash, DelegationId, PrincipalId};
pub use state::{Checkpoint, ScopedState, StateError, StateStore};
pub use time::{FixedTime, SystemTimeSource, TimeSource};
