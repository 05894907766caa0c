//! Simulated ledger dispatcher
//!
//! Balances live under the ledger's own address. Counter targets keep a
//! `count` slot under their own address. Every call moves its attached value
//! from the acting principal to the target before the payload runs.
//!
//! Payloads:
//! - empty: plain transfer
//! - [`INCREMENT`]: bump the target's counter
//! - [`REVERT`]: write to the target, then fail
//! - [`MINT`] ‖ 16-byte amount: credit the acting principal (target must be the ledger)

use agency_core::{Action, PrincipalId, StateStore};
use agency_engine::ActionDispatcher;
use tracing::debug;

/// Counter increment selector
pub const INCREMENT: [u8; 4] = [0xd0, 0x9d, 0xe0, 0x8a];
/// Always-failing selector
pub const REVERT: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];
/// Mint selector
pub const MINT: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];

const COUNT_SLOT: &[u8] = b"count";

/// Ledger-backed dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLedger;

impl SimulatedLedger {
    /// Address owning the balance slots
    pub fn address() -> PrincipalId {
        PrincipalId::derive("agency.testkit.ledger")
    }

    /// Balance of `account`
    pub fn balance(state: &StateStore, account: &PrincipalId) -> u128 {
        state
            .get_u128(&Self::address(), account.as_bytes())
            .unwrap_or_default()
    }

    /// Counter value of `target`
    pub fn counter(state: &StateStore, target: &PrincipalId) -> u128 {
        state.get_u128(target, COUNT_SLOT).unwrap_or_default()
    }

    /// Increment call
    pub fn increment(target: PrincipalId) -> Action {
        Action::new(target, 0, INCREMENT.to_vec())
    }

    /// Failing call
    pub fn reverting(target: PrincipalId) -> Action {
        Action::new(target, 0, REVERT.to_vec())
    }

    /// Plain value transfer
    pub fn transfer(target: PrincipalId, value: u128) -> Action {
        Action::new(target, value, Vec::new())
    }

    /// Mint `amount` to whoever executes the call
    pub fn mint(amount: u128) -> Action {
        let mut payload = MINT.to_vec();
        payload.extend_from_slice(&amount.to_be_bytes());
        Action::new(Self::address(), 0, payload)
    }

    fn move_value(state: &mut StateStore, from: &PrincipalId, to: &PrincipalId, value: u128) -> Result<(), String> {
        if value == 0 {
            return Ok(());
        }
        let ledger = Self::address();
        let available = Self::balance(state, from);
        let remaining = available
            .checked_sub(value)
            .ok_or_else(|| format!("insufficient-balance: {available} < {value}"))?;
        state.set_u128(ledger, from.as_bytes(), remaining);
        let credited = Self::balance(state, to).saturating_add(value);
        state.set_u128(ledger, to.as_bytes(), credited);
        Ok(())
    }
}

impl ActionDispatcher for SimulatedLedger {
    fn execute_call(
        &self,
        state: &mut StateStore,
        principal: &PrincipalId,
        action: &Action,
    ) -> Result<Vec<u8>, String> {
        Self::move_value(state, principal, &action.target, action.value)?;
        match action.selector() {
            None if action.payload.is_empty() => Ok(Vec::new()),
            Some(INCREMENT) => {
                let next = Self::counter(state, &action.target) + 1;
                state.set_u128(action.target, COUNT_SLOT, next);
                debug!(target_principal = %action.target, count = next, "Counter incremented");
                Ok(next.to_be_bytes().to_vec())
            }
            Some(REVERT) => {
                state.set(action.target, b"scratch", vec![1]);
                Err("reverted".to_string())
            }
            Some(MINT) if action.target == Self::address() => {
                let amount: [u8; 16] = action.payload[4..]
                    .try_into()
                    .map_err(|_| "mint amount must be 16 bytes".to_string())?;
                let credited = Self::balance(state, principal).saturating_add(u128::from_be_bytes(amount));
                state.set_u128(Self::address(), principal.as_bytes(), credited);
                Ok(Vec::new())
            }
            _ => Err("unknown-selector".to_string()),
        }
    }
}
