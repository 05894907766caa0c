//! Property-test strategies

use agency_core::{Action, PrincipalId};
use proptest::prelude::*;

/// Arbitrary principal
pub fn arb_principal() -> impl Strategy<Value = PrincipalId> {
    any::<[u8; 32]>().prop_map(PrincipalId::from_bytes)
}

/// Small pool of distinct principals
pub fn arb_principals(max: usize) -> impl Strategy<Value = Vec<PrincipalId>> {
    prop::collection::btree_set(arb_principal(), 1..=max).prop_map(|set| set.into_iter().collect())
}

/// Action with a bounded value and a short payload
pub fn arb_action() -> impl Strategy<Value = Action> {
    (arb_principal(), 0u128..1_000_000, prop::collection::vec(any::<u8>(), 0..12))
        .prop_map(|(target, value, payload)| Action::new(target, value, payload))
}

/// `entries` repeated `copies` times, interleaved
pub fn duplicated<T: Clone>(entries: &[T], copies: usize) -> Vec<T> {
    (0..copies).flat_map(|_| entries.iter().cloned()).collect()
}

/// Terms bytes whose length is not a multiple of `width`
pub fn arb_misaligned_terms(width: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..(width * 4)).prop_filter("misaligned", move |t| t.len() % width != 0)
}
