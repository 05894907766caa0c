//! Delegation chain validation
//!
//! Chains are ordered closest-to-redeemer first, root grant last. Validation
//! checks the redeemer against element 0, then walks every element checking
//! revocation, the delegator's signature (or on-engine approval) and the
//! authority link to the next element. The last element must carry root
//! authority. A root grant anywhere before the last element is rejected.

use crate::delegation::{Authority, Delegation};
use crate::registry::DelegationRegistry;
use agency_core::{AgencyError, AgencyResult, DelegationId, DomainSeparator, PrincipalId};
use agency_signature::SignatureVerifier;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    /// Delegation identifiers, in chain order
    pub ids: Vec<DelegationId>,
    /// Effective grantor of the guarded action
    pub root_delegator: PrincipalId,
    /// Principal redeeming the chain
    pub redeemer: PrincipalId,
}

impl ValidatedChain {
    /// Whether the redeemer acts for itself with no delegation in play
    pub fn is_self_action(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Validates chains against one engine instance's domain and signer set.
#[derive(Debug, Clone)]
pub struct ChainValidator {
    verifier: Arc<dyn SignatureVerifier>,
    domain: DomainSeparator,
    max_chain_length: usize,
}

impl ChainValidator {
    /// Create a validator
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        domain: DomainSeparator,
        max_chain_length: usize,
    ) -> Self {
        Self {
            verifier,
            domain,
            max_chain_length,
        }
    }

    /// Domain value signatures are checked against
    pub fn domain(&self) -> DomainSeparator {
        self.domain
    }

    /// Validate `chain` for `redeemer`.
    pub fn validate(
        &self,
        chain: &[Delegation],
        redeemer: &PrincipalId,
        registry: &DelegationRegistry,
    ) -> AgencyResult<ValidatedChain> {
        if chain.len() > self.max_chain_length {
            return Err(AgencyError::ChainTooLong {
                length: chain.len(),
                max: self.max_chain_length,
            });
        }

        let Some(first) = chain.first() else {
            return Ok(ValidatedChain {
                ids: Vec::new(),
                root_delegator: *redeemer,
                redeemer: *redeemer,
            });
        };
        if !first.delegate.admits(redeemer) {
            warn!(redeemer = %redeemer, "First delegation is not issued to the redeemer");
            return Err(AgencyError::InvalidDelegate { index: 0 });
        }

        let ids: Vec<DelegationId> = chain.iter().map(Delegation::id).collect();

        for (index, (delegation, id)) in chain.iter().zip(&ids).enumerate() {
            if registry.is_disabled(id) {
                return Err(AgencyError::CannotUseADisabledDelegation { index, id: *id });
            }
            self.check_authorization(index, delegation, id, registry)?;

            let parent = chain.get(index + 1).zip(ids.get(index + 1));
            match (delegation.authority, parent) {
                (Authority::Root, None) => {}
                (Authority::Parent(expected), Some((next, next_id))) => {
                    if expected != *next_id || !next.delegate.admits(&delegation.delegator) {
                        return Err(AgencyError::InvalidAuthority { index });
                    }
                }
                (Authority::Root, Some(_)) | (Authority::Parent(_), None) => {
                    return Err(AgencyError::InvalidAuthority { index });
                }
            }
        }

        let root_delegator = chain
            .last()
            .map_or(*redeemer, |delegation| delegation.delegator);
        debug!(
            redeemer = %redeemer,
            root_delegator = %root_delegator,
            length = chain.len(),
            "Delegation chain validated"
        );
        Ok(ValidatedChain {
            ids,
            root_delegator,
            redeemer: *redeemer,
        })
    }

    fn check_authorization(
        &self,
        index: usize,
        delegation: &Delegation,
        id: &DelegationId,
        registry: &DelegationRegistry,
    ) -> AgencyResult<()> {
        if registry.is_approved(id) {
            return Ok(());
        }
        if delegation.signature.is_empty() {
            return Err(AgencyError::EmptySignature { index });
        }
        let digest = self.domain.signing_digest(id);
        self.verifier
            .verify_signature(&delegation.delegator, &digest, &delegation.signature)
            .map_err(|e| AgencyError::InvalidSignature {
                index,
                reason: e.to_string(),
            })
    }
}
