//! Restricts every call's method selector to a listed set

use crate::enforcer::{enforcer_address, CaveatEnforcer, CaveatError, HookContext, HookInput};
use crate::terms::SelectorList;
use agency_core::PrincipalId;

/// Terms: concatenated 4-byte selectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedMethods;

impl AllowedMethods {
    /// Enforcer name
    pub const NAME: &'static str = "allowed_methods";

    /// Well-known address
    pub fn address() -> PrincipalId {
        enforcer_address(Self::NAME)
    }
}

impl CaveatEnforcer for AllowedMethods {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_hook(&self, _ctx: &mut HookContext<'_>, input: &HookInput<'_>) -> Result<(), CaveatError> {
        let allowed = SelectorList::parse(input.terms)?;
        for action in input.execution.actions() {
            let selector = action
                .selector()
                .ok_or_else(|| CaveatError::new("invalid-call-data-length"))?;
            if !allowed.contains(&selector) {
                return Err(CaveatError::new(format!(
                    "method-not-allowed: 0x{:02x}{:02x}{:02x}{:02x}",
                    selector[0], selector[1], selector[2], selector[3]
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::{call, Harness};

    const INCREMENT: [u8; 4] = [0xd0, 0x9d, 0xe0, 0x8a];

    #[test]
    fn test_listed_selector_passes() {
        let mut h = Harness::new();
        let mut payload = INCREMENT.to_vec();
        payload.extend_from_slice(&[0; 32]);
        assert!(h
            .before(&AllowedMethods, AllowedMethods::address(), &INCREMENT, &[], &call("c", 0, &payload))
            .is_ok());
    }

    #[test]
    fn test_other_selector_fails() {
        let mut h = Harness::new();
        let err = h
            .before(&AllowedMethods, AllowedMethods::address(), &INCREMENT, &[], &call("c", 0, &[1, 2, 3, 4]))
            .unwrap_err();
        assert_eq!(err.reason, "method-not-allowed: 0x01020304");
    }

    #[test]
    fn test_short_payload_fails() {
        let mut h = Harness::new();
        let err = h
            .before(&AllowedMethods, AllowedMethods::address(), &INCREMENT, &[], &call("c", 0, &[0xd0]))
            .unwrap_err();
        assert_eq!(err.reason, "invalid-call-data-length");
    }
}
