//! Threshold (M-of-N) group credentials
//!
//! A group principal's credential is a list of member signatures, each
//! carrying the member's own credential, which may itself be a nested group
//! credential. Entries must be strictly ascending by member address: a
//! duplicate entry would let one member's proof fill two quorum slots.

use crate::verifier::SignatureError;
use agency_core::PrincipalId;
use bincode::Options;
use serde::{Deserialize, Serialize};

/// One member's contribution to a group credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    /// Member principal
    pub signer: PrincipalId,
    /// Member's own credential (Ed25519 bytes or a nested group credential)
    #[serde(with = "serde_bytes")]
    pub credential: Vec<u8>,
}

/// Structured credential blob for a threshold group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThresholdCredential {
    /// Member signatures in ascending signer order
    pub entries: Vec<MemberSignature>,
}

fn codec(limit: usize) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit as u64)
        .reject_trailing_bytes()
}

impl ThresholdCredential {
    /// Build a credential, sorting entries into canonical order.
    pub fn from_entries(mut entries: Vec<MemberSignature>) -> Self {
        entries.sort_by(|a, b| a.signer.cmp(&b.signer));
        Self { entries }
    }

    /// Encode to the wire format.
    pub fn encode(&self) -> Vec<u8> {
        // Bounded only by the in-memory size of `self`.
        codec(usize::MAX).serialize(self).unwrap_or_default()
    }

    /// Decode from the wire format; the decoder never reads past `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, SignatureError> {
        codec(bytes.len())
            .deserialize(bytes)
            .map_err(|e| SignatureError::Malformed {
                reason: format!("group credential: {e}"),
            })
    }

    /// Check quorum size and canonical ordering.
    pub fn check_canonical(&self, threshold: usize) -> Result<(), SignatureError> {
        if self.entries.len() < threshold {
            return Err(SignatureError::InsufficientSigners {
                required: threshold,
                provided: self.entries.len(),
            });
        }
        for (position, pair) in self.entries.windows(2).enumerate() {
            if pair[0].signer >= pair[1].signer {
                return Err(SignatureError::NonCanonicalOrder {
                    position: position + 1,
                });
            }
        }
        Ok(())
    }
}
