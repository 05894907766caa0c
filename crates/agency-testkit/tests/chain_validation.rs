//! Chain integrity checks observed through the engine

use agency_core::{AgencyError, EngineConfig, Execution, ExecutionMode, PrincipalId};
use agency_delegation::{Authority, Delegate};
use agency_testkit::{DelegationBuilder, KeyTestFixture, SimulatedLedger, TestEngine};
use assert_matches::assert_matches;

fn increment() -> Execution {
    Execution::Single(SimulatedLedger::increment(PrincipalId::derive("counter")))
}

struct Hops {
    engine: TestEngine,
    keys: Vec<KeyTestFixture>,
}

/// Linear chain `keys[0] -> keys[1] -> ... -> keys[n]`, leaf first.
fn hops(n: usize) -> (Hops, Vec<agency_delegation::Delegation>) {
    let mut engine = TestEngine::new();
    let keys: Vec<KeyTestFixture> = (0..=n).map(|i| engine.key(&format!("hop-{i}"))).collect();
    let domain = engine.domain();
    let mut chain = Vec::with_capacity(n);
    let mut parent = DelegationBuilder::root(keys[0].principal())
        .to(keys[1].principal())
        .sign(&keys[0], &domain);
    chain.push(parent.clone());
    for i in 1..n {
        parent = DelegationBuilder::child_of(&parent, keys[i].principal())
            .to(keys[i + 1].principal())
            .sign(&keys[i], &domain);
        chain.push(parent.clone());
    }
    chain.reverse();
    (Hops { engine, keys }, chain)
}

#[test]
fn test_valid_chain_redeems() {
    let (Hops { mut engine, keys }, chain) = hops(4);
    let outcome = engine
        .redeem(&keys[4].principal(), chain, ExecutionMode::Default, increment())
        .unwrap();
    assert_eq!(outcome.root_delegator, keys[0].principal());
    assert_eq!(outcome.delegation_ids.len(), 4);
}

#[test]
fn test_wrong_redeemer_fails_at_leaf() {
    let (Hops { mut engine, keys }, chain) = hops(2);
    assert_matches!(
        engine.redeem(&keys[1].principal(), chain, ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidDelegate { index: 0 })
    );
}

#[test]
fn test_missing_link_is_invalid_authority() {
    let (Hops { mut engine, keys }, mut chain) = hops(3);
    chain.remove(1);
    assert_matches!(
        engine.redeem(&keys[3].principal(), chain, ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidAuthority { index: 0 })
    );
}

#[test]
fn test_truncated_chain_is_invalid_authority() {
    let (Hops { mut engine, keys }, mut chain) = hops(3);
    chain.pop();
    assert_matches!(
        engine.redeem(&keys[3].principal(), chain, ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidAuthority { index: 1 })
    );
}

#[test]
fn test_root_in_the_middle_is_invalid_authority() {
    let (Hops { mut engine, keys }, mut chain) = hops(2);
    let domain = engine.domain();
    // A root grant from keys[1] to keys[2], followed by an unrelated element.
    chain[0] = DelegationBuilder::root(keys[1].principal())
        .to(keys[2].principal())
        .sign(&keys[1], &domain);
    assert_matches!(
        engine.redeem(&keys[2].principal(), chain, ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidAuthority { index: 0 })
    );
}

#[test]
fn test_parent_delegate_must_be_child_delegator() {
    let mut engine = TestEngine::new();
    let a = engine.key("a");
    let b = engine.key("b");
    let c = engine.key("c");
    let mallory = engine.key("mallory");
    let domain = engine.domain();
    let root = DelegationBuilder::root(a.principal()).to(b.principal()).sign(&a, &domain);
    // mallory re-delegates a grant issued to b
    let leaf = DelegationBuilder::child_of(&root, mallory.principal())
        .to(c.principal())
        .sign(&mallory, &domain);
    assert_matches!(
        engine.redeem(&c.principal(), vec![leaf, root], ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidAuthority { index: 0 })
    );
}

#[test]
fn test_open_parent_admits_any_re_delegator() {
    let mut engine = TestEngine::new();
    let a = engine.key("a");
    let b = engine.key("b");
    let c = engine.key("c");
    let domain = engine.domain();
    let root = DelegationBuilder::root(a.principal()).to_any().sign(&a, &domain);
    let leaf = DelegationBuilder::child_of(&root, b.principal())
        .to(c.principal())
        .sign(&b, &domain);
    assert_eq!(root.delegate, Delegate::Any);
    assert_eq!(leaf.authority, Authority::Parent(root.id()));
    assert!(engine
        .redeem(&c.principal(), vec![leaf, root], ExecutionMode::Default, increment())
        .is_ok());
}

#[test]
fn test_signature_by_someone_else_is_rejected() {
    let mut engine = TestEngine::new();
    let a = engine.key("a");
    let b = engine.key("b");
    let forged = DelegationBuilder::root(a.principal())
        .to(b.principal())
        .sign(&b, &engine.domain());
    assert_matches!(
        engine.redeem(&b.principal(), vec![forged], ExecutionMode::Default, increment()),
        Err(AgencyError::InvalidSignature { index: 0, .. })
    );
}

#[test]
fn test_disabled_intermediate_blocks_whole_chain() {
    let (Hops { mut engine, keys }, chain) = hops(3);
    engine
        .manager
        .disable_delegation(&keys[1].principal(), &chain[1])
        .unwrap();
    assert_matches!(
        engine.redeem(&keys[3].principal(), chain, ExecutionMode::Default, increment()),
        Err(AgencyError::CannotUseADisabledDelegation { index: 1, .. })
    );
}

#[test]
fn test_chain_length_bound() {
    let mut engine = TestEngine::with_config(EngineConfig {
        max_chain_length: 1,
        ..EngineConfig::default()
    });
    let a = engine.key("a");
    let b = engine.key("b");
    let c = engine.key("c");
    let domain = engine.domain();
    let root = DelegationBuilder::root(a.principal()).to(b.principal()).sign(&a, &domain);
    let leaf = DelegationBuilder::child_of(&root, b.principal())
        .to(c.principal())
        .sign(&b, &domain);
    assert_matches!(
        engine.redeem(&c.principal(), vec![leaf, root], ExecutionMode::Default, increment()),
        Err(AgencyError::ChainTooLong { length: 2, max: 1 })
    );
}
