//! Engine fixture
//!
//! [`TestEngine`] wires a [`DelegationManager`] to a shared signer
//! directory, a controllable clock and the [`SimulatedLedger`].

use crate::keys::KeyTestFixture;
use crate::ledger::SimulatedLedger;
use agency_caveats::{CaveatEnforcer, EnforcerRegistry};
use agency_core::{
    AgencyResult, DomainSeparator, EngineConfig, Execution, ExecutionMode, FixedTime, PrincipalId,
};
use agency_delegation::Delegation;
use agency_engine::{AdminState, DelegationManager, RedemptionOutcome};
use agency_signature::SignerDirectory;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed start time of every fixture clock
pub const GENESIS_SECS: u64 = 1_700_000_000;

/// Install a test-writer tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Engine plus the handles tests need to drive it.
pub struct TestEngine {
    /// Engine under test
    pub manager: DelegationManager,
    /// Signer directory shared with the engine's validator
    pub directory: Arc<SignerDirectory>,
    /// Engine clock
    pub clock: Arc<FixedTime>,
    /// Engine owner
    pub owner: KeyTestFixture,
    keys: HashMap<String, KeyTestFixture>,
}

impl TestEngine {
    /// Default-configured engine with the built-in enforcers
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine built from `config`
    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, EnforcerRegistry::with_builtins())
    }

    /// Default engine with extra enforcers registered next to the built-ins
    pub fn with_enforcers(extra: Vec<(PrincipalId, Arc<dyn CaveatEnforcer>)>) -> Self {
        let mut registry = EnforcerRegistry::with_builtins();
        for (address, enforcer) in extra {
            registry.register(address, enforcer);
        }
        Self::build(EngineConfig::default(), registry)
    }

    fn build(config: EngineConfig, enforcers: EnforcerRegistry) -> Self {
        init_tracing();
        let directory = Arc::new(SignerDirectory::new(config.max_signer_depth));
        let clock = Arc::new(FixedTime::new(GENESIS_SECS));
        let owner = KeyTestFixture::from_seed_string("owner");
        owner.register(&directory);
        let manager = DelegationManager::new(
            config,
            AdminState::new(owner.principal()),
            directory.clone(),
            Box::new(SimulatedLedger),
        )
        .expect("fixture config is valid")
        .with_enforcers(enforcers)
        .with_time_source(clock.clone());
        Self {
            manager,
            directory,
            clock,
            owner,
            keys: HashMap::new(),
        }
    }

    /// Key for `label`, created and registered on first use
    pub fn key(&mut self, label: &str) -> KeyTestFixture {
        let directory = &self.directory;
        self.keys
            .entry(label.to_string())
            .or_insert_with(|| {
                let key = KeyTestFixture::from_seed_string(label);
                key.register(directory);
                key
            })
            .clone()
    }

    /// Engine domain value
    pub fn domain(&self) -> DomainSeparator {
        self.manager.domain_separator()
    }

    /// Credit `amount` to `account` through a self-action
    pub fn fund(&mut self, account: &PrincipalId, amount: u128) {
        self.manager
            .redeem_delegations(
                account,
                &[Vec::new()],
                &[ExecutionMode::Default],
                &[Execution::Single(SimulatedLedger::mint(amount))],
            )
            .expect("mint succeeds");
    }

    /// Redeem a single chain in one call
    pub fn redeem(
        &mut self,
        redeemer: &PrincipalId,
        chain: Vec<Delegation>,
        mode: ExecutionMode,
        execution: Execution,
    ) -> AgencyResult<RedemptionOutcome> {
        let mut outcomes = self
            .manager
            .redeem_delegations(redeemer, &[chain], &[mode], &[execution])?;
        Ok(outcomes.remove(0))
    }

    /// Ledger balance of `account`
    pub fn balance(&self, account: &PrincipalId) -> u128 {
        SimulatedLedger::balance(self.manager.state(), account)
    }

    /// Counter value of `target`
    pub fn counter(&self, target: &PrincipalId) -> u128 {
        SimulatedLedger::counter(self.manager.state(), target)
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
