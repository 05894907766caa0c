//! Signer directory: principal address → signing scheme
//!
//! Verification is polymorphic over [`SignerKind`]. Group signers recurse into
//! their members; recursion is bounded by `max_depth`, which also terminates
//! membership cycles (a group listing itself, directly or transitively).

use crate::ed25519;
use crate::threshold::ThresholdCredential;
use crate::verifier::{SignatureError, SignatureVerifier};
use agency_core::{Hash32, PrincipalId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Default bound on group nesting.
pub const DEFAULT_MAX_SIGNER_DEPTH: usize = 4;

/// Signing scheme of one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerKind {
    /// Single Ed25519 key
    Ed25519 {
        /// 32-byte verifying key
        verifying_key: [u8; 32],
    },
    /// M-of-N group of other principals
    Threshold {
        /// Required number of member signatures
        threshold: usize,
        /// Group members
        members: BTreeSet<PrincipalId>,
    },
}

impl SignerKind {
    fn validate(&self) -> Result<(), SignatureError> {
        match self {
            SignerKind::Ed25519 { .. } => Ok(()),
            SignerKind::Threshold { threshold, members } => {
                if *threshold == 0 || *threshold > members.len() {
                    return Err(SignatureError::InvalidThreshold {
                        threshold: *threshold,
                        members: members.len(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Shared registry of signer schemes.
#[derive(Debug)]
pub struct SignerDirectory {
    signers: RwLock<HashMap<PrincipalId, SignerKind>>,
    max_depth: usize,
}

impl SignerDirectory {
    /// Create an empty directory with the given nesting bound
    pub fn new(max_depth: usize) -> Self {
        Self {
            signers: RwLock::new(HashMap::new()),
            max_depth,
        }
    }

    /// Configured nesting bound
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Register (or replace) a principal's scheme.
    pub fn register(&self, principal: PrincipalId, kind: SignerKind) -> Result<(), SignatureError> {
        kind.validate()?;
        debug!(principal = %principal, kind = ?kind, "Registering signer");
        self.signers.write().insert(principal, kind);
        Ok(())
    }

    /// Register a single-key signer at the address derived from its key.
    pub fn register_ed25519(&self, verifying_key: [u8; 32]) -> PrincipalId {
        let principal = PrincipalId::from_verifying_key(&verifying_key);
        self.signers
            .write()
            .insert(principal, SignerKind::Ed25519 { verifying_key });
        principal
    }

    /// Register a threshold group at an explicit address.
    pub fn register_threshold(
        &self,
        principal: PrincipalId,
        threshold: usize,
        members: impl IntoIterator<Item = PrincipalId>,
    ) -> Result<(), SignatureError> {
        self.register(
            principal,
            SignerKind::Threshold {
                threshold,
                members: members.into_iter().collect(),
            },
        )
    }

    /// Look up a principal's scheme
    pub fn signer(&self, principal: &PrincipalId) -> Option<SignerKind> {
        self.signers.read().get(principal).cloned()
    }

    fn verify_at_depth(
        &self,
        principal: &PrincipalId,
        digest: &Hash32,
        credential: &[u8],
        depth: usize,
    ) -> Result<(), SignatureError> {
        if depth > self.max_depth {
            return Err(SignatureError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let kind = self
            .signer(principal)
            .ok_or(SignatureError::UnknownSigner {
                principal: *principal,
            })?;

        match kind {
            SignerKind::Ed25519 { verifying_key } => {
                ed25519::verify(principal, &verifying_key, digest, credential)
            }
            SignerKind::Threshold { threshold, members } => {
                let group = ThresholdCredential::decode(credential)?;
                group.check_canonical(threshold)?;
                for entry in &group.entries {
                    if !members.contains(&entry.signer) {
                        return Err(SignatureError::UnknownMember {
                            member: entry.signer,
                        });
                    }
                    self.verify_at_depth(&entry.signer, digest, &entry.credential, depth + 1)?;
                }
                debug!(
                    group = %principal,
                    threshold,
                    signers = group.entries.len(),
                    depth,
                    "Threshold credential verified"
                );
                Ok(())
            }
        }
    }
}

impl Default for SignerDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIGNER_DEPTH)
    }
}

impl SignatureVerifier for SignerDirectory {
    fn verify_signature(
        &self,
        principal: &PrincipalId,
        digest: &Hash32,
        credential: &[u8],
    ) -> Result<(), SignatureError> {
        let result = self.verify_at_depth(principal, digest, credential, 0);
        if let Err(error) = &result {
            warn!(principal = %principal, error = %error, "Signature rejected");
        }
        result
    }
}
