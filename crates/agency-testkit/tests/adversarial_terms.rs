//! Duplicated and malformed terms can only add linear cost

use agency_caveats::{AllowedTargets, PrincipalList};
use agency_core::{AgencyError, Execution, ExecutionMode, PrincipalId};
use agency_delegation::Caveat;
use agency_testkit::strategies::{arb_misaligned_terms, arb_principal, arb_principals, duplicated};
use agency_testkit::{DelegationBuilder, SimulatedLedger, TestEngine};
use proptest::prelude::*;

fn outcome_for(terms: Vec<u8>, target: PrincipalId) -> Result<bool, String> {
    let mut engine = TestEngine::new();
    let alice = engine.key("alice");
    let grant = DelegationBuilder::root(alice.principal())
        .caveat(Caveat::new(AllowedTargets::address(), terms))
        .sign(&alice, &engine.domain());
    engine
        .redeem(
            &PrincipalId::derive("anyone"),
            vec![grant],
            ExecutionMode::Default,
            Execution::Single(SimulatedLedger::increment(target)),
        )
        .map(|o| o.succeeded)
        .map_err(|e| match e {
            AgencyError::CaveatViolation { reason, .. } => reason,
            other => other.to_string(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_duplicates_never_change_outcome(
        targets in arb_principals(6),
        probe in arb_principal(),
        pick in any::<bool>(),
        copies in 2usize..16,
    ) {
        let target = if pick { targets[0] } else { probe };
        let once = outcome_for(PrincipalList::encode(&targets), target);
        let repeated = outcome_for(PrincipalList::encode(&duplicated(&targets, copies)), target);
        prop_assert_eq!(once, repeated);
    }

    #[test]
    fn prop_scanned_grows_linearly_with_copies(targets in arb_principals(8), copies in 1usize..64) {
        let terms = PrincipalList::encode(&duplicated(&targets, copies));
        let list = PrincipalList::parse(&terms).unwrap();
        prop_assert_eq!(list.scanned(), targets.len() * copies);
        prop_assert_eq!(list.distinct(), targets.len());
    }

    #[test]
    fn prop_misaligned_terms_are_rejected(terms in arb_misaligned_terms(32)) {
        let reason = outcome_for(terms, PrincipalId::derive("counter")).unwrap_err();
        prop_assert!(reason.starts_with("invalid-terms-length"));
    }
}
