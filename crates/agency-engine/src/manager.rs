//! Batched redemption orchestrator
//!
//! `redeem_delegations` runs every batch item in order:
//! validate chain → before hooks → dispatch → after hooks. The whole call
//! runs under one outer state checkpoint. Any error reverts it and drops the
//! call's buffered events. A `Try` item additionally runs its dispatch under
//! an inner checkpoint that is reverted when any of its calls failed.

use crate::admin::AdminState;
use crate::dispatcher::{ActionDispatcher, CallResult};
use crate::enforcement::HookPlan;
use crate::events::EngineEvent;
use agency_caveats::EnforcerRegistry;
use agency_core::{
    AgencyError, AgencyResult, DelegationId, DomainSeparator, EngineConfig, Execution,
    ExecutionMode, PrincipalId, StateStore, SystemTimeSource, TimeSource,
};
use agency_delegation::{ChainValidator, Delegation, DelegationRegistry};
use agency_signature::SignatureVerifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionOutcome {
    /// Position in the batch
    pub batch_index: usize,
    /// Effective grantor the action ran for
    pub root_delegator: PrincipalId,
    /// Exercised delegations, in chain order
    pub delegation_ids: Vec<DelegationId>,
    /// Whether the guarded action took effect
    pub succeeded: bool,
    /// Per-call results reported by the dispatcher
    pub results: Vec<CallResult>,
}

/// Delegation redemption engine.
#[derive(Debug)]
pub struct DelegationManager {
    config: EngineConfig,
    domain: DomainSeparator,
    validator: ChainValidator,
    registry: DelegationRegistry,
    enforcers: EnforcerRegistry,
    dispatcher: Box<dyn ActionDispatcher>,
    state: StateStore,
    time: Arc<dyn TimeSource>,
    admin: AdminState,
    events: Vec<EngineEvent>,
}

impl DelegationManager {
    /// Create an engine with the built-in enforcers and wall-clock time.
    pub fn new(
        config: EngineConfig,
        admin: AdminState,
        verifier: Arc<dyn SignatureVerifier>,
        dispatcher: Box<dyn ActionDispatcher>,
    ) -> AgencyResult<Self> {
        config.validate()?;
        let domain = DomainSeparator::new(&config.domain_params());
        let validator = ChainValidator::new(verifier, domain, config.max_chain_length);
        info!(
            engine = %config.engine_name,
            version = %config.engine_version,
            network_id = config.network_id,
            domain = %domain,
            "Delegation manager created"
        );
        Ok(Self {
            config,
            domain,
            validator,
            registry: DelegationRegistry::new(),
            enforcers: EnforcerRegistry::with_builtins(),
            dispatcher,
            state: StateStore::new(),
            time: Arc::new(SystemTimeSource),
            admin,
            events: Vec::new(),
        })
    }

    /// Replace the enforcer registry
    pub fn with_enforcers(mut self, enforcers: EnforcerRegistry) -> Self {
        self.enforcers = enforcers;
        self
    }

    /// Replace the time source
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Seed the engine with existing state
    pub fn with_state(mut self, state: StateStore) -> Self {
        self.state = state;
        self
    }

    // Read surface

    /// Identifier of a delegation
    pub fn delegation_id(&self, delegation: &Delegation) -> DelegationId {
        delegation.id()
    }

    /// Whether a delegation is disabled
    pub fn is_disabled(&self, id: &DelegationId) -> bool {
        self.registry.is_disabled(id)
    }

    /// Whether a delegation was approved on-engine
    pub fn is_approved(&self, id: &DelegationId) -> bool {
        self.registry.is_approved(id)
    }

    /// Domain value mixed into every signing digest
    pub fn domain_separator(&self) -> DomainSeparator {
        self.domain
    }

    /// Current owner
    pub fn owner(&self) -> PrincipalId {
        self.admin.owner()
    }

    /// Proposed owner
    pub fn pending_owner(&self) -> Option<PrincipalId> {
        self.admin.pending_owner()
    }

    /// Whether redemption is paused
    pub fn is_paused(&self) -> bool {
        self.admin.is_paused()
    }

    /// Committed events, oldest first
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Committed state
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered enforcers
    pub fn enforcers(&self) -> &EnforcerRegistry {
        &self.enforcers
    }

    // Write surface

    /// Register a delegation for signature-less redemption. Caller must be its delegator.
    pub fn approve_delegation(&mut self, caller: &PrincipalId, delegation: &Delegation) -> AgencyResult<DelegationId> {
        let id = self.registry.approve(delegation, caller)?;
        self.events.push(EngineEvent::ApprovedDelegation {
            id,
            delegator: delegation.delegator,
            delegate: delegation.delegate,
        });
        Ok(id)
    }

    /// Disable a delegation. Caller must be its delegator.
    pub fn disable_delegation(&mut self, caller: &PrincipalId, delegation: &Delegation) -> AgencyResult<DelegationId> {
        let id = self.registry.disable(delegation, caller)?;
        self.events.push(EngineEvent::DisabledDelegation {
            id,
            delegator: delegation.delegator,
            delegate: delegation.delegate,
        });
        Ok(id)
    }

    /// Re-enable a delegation. Caller must be its delegator.
    pub fn enable_delegation(&mut self, caller: &PrincipalId, delegation: &Delegation) -> AgencyResult<DelegationId> {
        let id = self.registry.enable(delegation, caller)?;
        self.events.push(EngineEvent::EnabledDelegation {
            id,
            delegator: delegation.delegator,
            delegate: delegation.delegate,
        });
        Ok(id)
    }

    /// Pause redemption (owner only)
    pub fn pause(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.admin.pause(caller)?;
        self.events.push(EngineEvent::Paused { by: *caller });
        Ok(())
    }

    /// Resume redemption (owner only)
    pub fn unpause(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.admin.unpause(caller)?;
        self.events.push(EngineEvent::Unpaused { by: *caller });
        Ok(())
    }

    /// Propose a new owner (owner only)
    pub fn transfer_ownership(&mut self, caller: &PrincipalId, new_owner: PrincipalId) -> AgencyResult<()> {
        self.admin.transfer_ownership(caller, new_owner)?;
        self.events.push(EngineEvent::OwnershipTransferStarted {
            previous_owner: *caller,
            new_owner,
        });
        Ok(())
    }

    /// Accept a pending ownership transfer (pending owner only)
    pub fn accept_ownership(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        let previous_owner = self.admin.accept_ownership(caller)?;
        self.events.push(EngineEvent::OwnershipTransferred {
            previous_owner,
            new_owner: *caller,
        });
        Ok(())
    }

    /// Withdraw a pending ownership transfer (owner only)
    pub fn cancel_ownership_transfer(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.admin.cancel_transfer(caller)
    }

    // Redemption

    /// Redeem a batch of `(chain, mode, execution)` items for `redeemer`.
    ///
    /// Fails without touching any item when the engine is paused or the
    /// batch is malformed. Otherwise either every item's effects commit or
    /// none do; a `Try` item whose action failed only loses its own
    /// action's effects.
    pub fn redeem_delegations(
        &mut self,
        redeemer: &PrincipalId,
        chains: &[Vec<Delegation>],
        modes: &[ExecutionMode],
        executions: &[Execution],
    ) -> AgencyResult<Vec<RedemptionOutcome>> {
        self.admin.ensure_not_paused()?;
        self.check_shape(chains, modes, executions)?;

        let now = self.time.now_secs();
        let mut buffered = Vec::new();
        let checkpoint = self.state.checkpoint();

        let result = chains
            .iter()
            .zip(modes)
            .zip(executions)
            .enumerate()
            .map(|(index, ((chain, mode), execution))| {
                self.redeem_item(index, redeemer, chain, *mode, execution, now, &mut buffered)
            })
            .collect::<AgencyResult<Vec<_>>>();

        match result {
            Ok(outcomes) => {
                self.state.commit(checkpoint)?;
                self.events.append(&mut buffered);
                info!(
                    redeemer = %redeemer,
                    items = outcomes.len(),
                    failed = outcomes.iter().filter(|o| !o.succeeded).count(),
                    "Redemption committed"
                );
                Ok(outcomes)
            }
            Err(err) => {
                self.state.revert(checkpoint)?;
                warn!(
                    redeemer = %redeemer,
                    category = %err.category(),
                    error = %err,
                    "Redemption reverted"
                );
                Err(err)
            }
        }
    }

    fn check_shape(
        &self,
        chains: &[Vec<Delegation>],
        modes: &[ExecutionMode],
        executions: &[Execution],
    ) -> AgencyResult<()> {
        if chains.len() != modes.len() || chains.len() != executions.len() {
            return Err(AgencyError::BatchDataLengthMismatch {
                chains: chains.len(),
                modes: modes.len(),
                executions: executions.len(),
            });
        }
        if chains.len() > self.config.max_batch_size {
            return Err(AgencyError::BatchTooLarge {
                size: chains.len(),
                max: self.config.max_batch_size,
            });
        }
        if let Some(index) = executions.iter().position(Execution::is_empty) {
            return Err(AgencyError::EmptyExecution { index });
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn redeem_item(
        &mut self,
        index: usize,
        redeemer: &PrincipalId,
        chain: &[Delegation],
        mode: ExecutionMode,
        execution: &Execution,
        now: u64,
        buffered: &mut Vec<EngineEvent>,
    ) -> AgencyResult<RedemptionOutcome> {
        let validated = self.validator.validate(chain, redeemer, &self.registry)?;
        let plan = HookPlan::build(&self.enforcers, chain, &validated, mode)?;
        let grantor = validated.root_delegator;

        plan.run_before(&mut self.state, now, execution)?;

        let (succeeded, results) = match mode {
            ExecutionMode::Default => {
                let outcome = self
                    .dispatcher
                    .dispatch(&mut self.state, &grantor, execution, mode)
                    .map_err(|e| e.into_agency(index))?;
                (true, outcome.results)
            }
            ExecutionMode::Try => {
                let checkpoint = self.state.checkpoint();
                let outcome = self.dispatcher.dispatch(&mut self.state, &grantor, execution, mode);
                match outcome {
                    Ok(outcome) if outcome.all_succeeded() => {
                        self.state.commit(checkpoint)?;
                        (true, outcome.results)
                    }
                    failed => {
                        self.state.revert(checkpoint)?;
                        let results = match failed {
                            Ok(outcome) => outcome.results.into_iter().map(CallResult::reverted).collect(),
                            Err(err) => vec![CallResult::failed(&err.to_string())],
                        };
                        warn!(batch_index = index, root_delegator = %grantor, "Try execution failed");
                        buffered.push(EngineEvent::TryExecutionFailed {
                            batch_index: index,
                            root_delegator: grantor,
                            results: results.clone(),
                        });
                        (false, results)
                    }
                }
            }
        };

        plan.run_after(&mut self.state, now, execution, succeeded)?;

        buffered.extend(validated.ids.iter().map(|id| EngineEvent::RedeemedDelegation {
            root_delegator: grantor,
            redeemer: *redeemer,
            delegation: *id,
        }));
        debug!(
            batch_index = index,
            mode = %mode,
            call_type = ?execution.call_type(),
            root_delegator = %grantor,
            chain_length = validated.ids.len(),
            succeeded,
            "Batch item redeemed"
        );
        Ok(RedemptionOutcome {
            batch_index: index,
            root_delegator: grantor,
            delegation_ids: validated.ids,
            succeeded,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_core::{Action, StateStore};
    use agency_signature::SignerDirectory;
    use assert_matches::assert_matches;

    /// Counts calls per target.
    #[derive(Debug)]
    struct Tally;

    impl ActionDispatcher for Tally {
        fn execute_call(
            &self,
            state: &mut StateStore,
            _principal: &PrincipalId,
            action: &Action,
        ) -> Result<Vec<u8>, String> {
            if action.payload == b"fail" {
                return Err("requested failure".into());
            }
            let n = state.get_u128(&action.target, b"calls").map_err(|e| e.to_string())?;
            state.set_u128(action.target, b"calls", n + 1);
            Ok(Vec::new())
        }
    }

    fn owner() -> PrincipalId {
        PrincipalId::derive("owner")
    }

    fn engine() -> DelegationManager {
        DelegationManager::new(
            EngineConfig::default(),
            AdminState::new(owner()),
            Arc::new(SignerDirectory::default()),
            Box::new(Tally),
        )
        .unwrap()
    }

    fn call(payload: &[u8]) -> Execution {
        Execution::Single(Action::new(PrincipalId::derive("counter"), 0, payload.to_vec()))
    }

    fn calls(engine: &DelegationManager) -> u128 {
        engine.state().get_u128(&PrincipalId::derive("counter"), b"calls").unwrap()
    }

    #[test]
    fn test_self_action_with_empty_chain() {
        let mut engine = engine();
        let me = PrincipalId::derive("me");
        let outcomes = engine
            .redeem_delegations(&me, &[Vec::new()], &[ExecutionMode::Default], &[call(b"")])
            .unwrap();
        assert_eq!(outcomes[0].root_delegator, me);
        assert!(outcomes[0].succeeded);
        assert_eq!(calls(&engine), 1);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_shape_mismatch_runs_nothing() {
        let mut engine = engine();
        let result = engine.redeem_delegations(
            &owner(),
            &[Vec::new(), Vec::new()],
            &[ExecutionMode::Default; 3],
            &[call(b""), call(b"")],
        );
        assert_matches!(
            result,
            Err(AgencyError::BatchDataLengthMismatch { chains: 2, modes: 3, executions: 2 })
        );
        assert_eq!(calls(&engine), 0);
    }

    #[test]
    fn test_empty_batch_execution_is_a_shape_error() {
        let mut engine = engine();
        assert_matches!(
            engine.redeem_delegations(&owner(), &[Vec::new()], &[ExecutionMode::Try], &[Execution::Batch(Vec::new())]),
            Err(AgencyError::EmptyExecution { index: 0 })
        );
    }

    #[test]
    fn test_batch_size_bound() {
        let config = EngineConfig {
            max_batch_size: 1,
            ..EngineConfig::default()
        };
        let mut engine = DelegationManager::new(
            config,
            AdminState::new(owner()),
            Arc::new(SignerDirectory::default()),
            Box::new(Tally),
        )
        .unwrap();
        assert_matches!(
            engine.redeem_delegations(
                &owner(),
                &[Vec::new(), Vec::new()],
                &[ExecutionMode::Default; 2],
                &[call(b""), call(b"")],
            ),
            Err(AgencyError::BatchTooLarge { size: 2, max: 1 })
        );
    }

    #[test]
    fn test_paused_engine_rejects_redemption() {
        let mut engine = engine();
        engine.pause(&owner()).unwrap();
        assert_matches!(
            engine.redeem_delegations(&owner(), &[Vec::new()], &[ExecutionMode::Default], &[call(b"")]),
            Err(AgencyError::Paused)
        );
        assert_eq!(calls(&engine), 0);
        engine.unpause(&owner()).unwrap();
        assert!(engine
            .redeem_delegations(&owner(), &[Vec::new()], &[ExecutionMode::Default], &[call(b"")])
            .is_ok());
    }

    #[test]
    fn test_default_failure_unwinds_earlier_items() {
        let mut engine = engine();
        let result = engine.redeem_delegations(
            &owner(),
            &[Vec::new(), Vec::new()],
            &[ExecutionMode::Default; 2],
            &[call(b""), call(b"fail")],
        );
        assert_matches!(result, Err(AgencyError::ActionFailed { index: 1, .. }));
        assert_eq!(calls(&engine), 0);
    }

    #[test]
    fn test_try_failure_keeps_earlier_items() {
        let mut engine = engine();
        let outcomes = engine
            .redeem_delegations(
                &owner(),
                &[Vec::new(), Vec::new()],
                &[ExecutionMode::Default, ExecutionMode::Try],
                &[call(b""), call(b"fail")],
            )
            .unwrap();
        assert!(outcomes[0].succeeded);
        assert!(!outcomes[1].succeeded);
        assert_eq!(calls(&engine), 1);
        assert_matches!(
            engine.events(),
            [EngineEvent::TryExecutionFailed { batch_index: 1, .. }]
        );
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = EngineConfig {
            engine_name: String::new(),
            ..EngineConfig::default()
        };
        assert_matches!(
            DelegationManager::new(
                config,
                AdminState::new(owner()),
                Arc::new(SignerDirectory::default()),
                Box::new(Tally),
            ),
            Err(AgencyError::Config { .. })
        );
    }
}
