//! Agency Engine - batched delegation redemption
//!
//! The [`DelegationManager`] validates each item's delegation chain, runs
//! caveat hooks around the guarded action, dispatches the action through an
//! [`ActionDispatcher`] and commits or reverts the whole call atomically.

#![forbid(unsafe_code)]

/// Pause switch and ownership state
pub mod admin;

/// Action dispatcher boundary
pub mod dispatcher;

/// Caveat hook ordering
pub mod enforcement;

/// Engine events
pub mod events;

/// Redemption orchestrator
pub mod manager;

pub use admin::AdminState;
pub use dispatcher::{ActionDispatcher, CallResult, DispatchError, DispatchOutcome, REVERTED};
pub use enforcement::HookPlan;
pub use events::EngineEvent;
pub use manager::{DelegationManager, RedemptionOutcome};
