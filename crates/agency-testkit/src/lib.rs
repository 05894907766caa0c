//! Agency Testkit - shared fixtures for engine and scenario tests
//!
//! Seeded signing keys, delegation builders, a simulated ledger dispatcher,
//! instrumented enforcers and property-test strategies.

#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Delegation and caveat builders
pub mod builders;

/// Recording and failing enforcers
pub mod enforcers;

/// Engine fixture
pub mod fixtures;

/// Deterministic signing keys
pub mod keys;

/// Simulated ledger dispatcher
pub mod ledger;

/// Property-test strategies
pub mod strategies;

pub use builders::DelegationBuilder;
pub use enforcers::{FailingEnforcer, HookRecord, RecordingEnforcer};
pub use fixtures::{init_tracing, TestEngine, GENESIS_SECS};
pub use keys::{KeySet, KeyTestFixture};
pub use ledger::{SimulatedLedger, INCREMENT, MINT, REVERT};
