//! Validity window on redemption time

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::decode_u64_pair;
use agency_core::PrincipalId;

/// Terms: 8-byte `not_before` ‖ 8-byte `not_after`, Unix seconds. Zero leaves a side open.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp;

impl Timestamp {
    /// Enforcer name
    pub const NAME: &'static str = "timestamp";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }

    /// Encode a window as terms
    pub fn terms(not_before: u64, not_after: u64) -> Vec<u8> {
        let mut out = not_before.to_be_bytes().to_vec();
        out.extend_from_slice(&not_after.to_be_bytes());
        out
    }
}

impl CaveatEnforcer for Timestamp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let (not_before, not_after) = decode_u64_pair(input.terms)?;
        let now = ctx.now();
        if not_before != 0 && now < not_before {
            return Err(CaveatError::new(format!("early-delegation: now {now} < {not_before}")));
        }
        if not_after != 0 && now > not_after {
            return Err(CaveatError::new(format!("expired-delegation: now {now} > {not_after}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::{call, Harness};

    fn check(now: u64, not_before: u64, not_after: u64) -> Result<(), CaveatError> {
        let mut h = Harness::new();
        h.now = now;
        h.before(
            &Timestamp,
            Timestamp::address(),
            &Timestamp::terms(not_before, not_after),
            &[],
            &call("t", 0, &[]),
        )
    }

    #[test]
    fn test_window_bounds() {
        assert!(check(100, 100, 200).is_ok());
        assert!(check(200, 100, 200).is_ok());
        assert!(check(99, 100, 200).unwrap_err().reason.starts_with("early-delegation"));
        assert!(check(201, 100, 200).unwrap_err().reason.starts_with("expired-delegation"));
    }

    #[test]
    fn test_open_sides() {
        assert!(check(5, 0, 10).is_ok());
        assert!(check(u64::MAX, 10, 0).is_ok());
        assert!(check(0, 0, 0).is_ok());
    }
}
