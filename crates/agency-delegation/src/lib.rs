//! Agency Delegation - grants, revocation and chain validation
//!
//! A [`Delegation`] is a signed capability grant addressed by the digest of
//! its terms. The [`DelegationRegistry`] tracks which grants their delegators
//! have disabled or approved on-engine. The [`ChainValidator`] walks a chain
//! of grants back to a root and returns the effective grantor.

#![forbid(unsafe_code)]

/// Chain validation
pub mod chain;

/// Grant and caveat records
pub mod delegation;

/// Revocation and approval state
pub mod registry;

pub use chain::{ChainValidator, ValidatedChain};
pub use delegation::{Authority, Caveat, Delegate, Delegation};
pub use registry::DelegationRegistry;
