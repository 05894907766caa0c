//! Signature verification capability consumed by the chain validator

use agency_core::{Hash32, PrincipalId};

/// Why a credential failed to verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// No signer scheme is registered for the principal
    #[error("no signer registered for {principal}")]
    UnknownSigner {
        /// Principal that could not be resolved
        principal: PrincipalId,
    },

    /// Credential bytes could not be decoded for the signer's scheme
    #[error("malformed credential: {reason}")]
    Malformed {
        /// Decoder diagnostic
        reason: String,
    },

    /// Registered verifying key is not a valid curve point
    #[error("invalid verifying key for {principal}")]
    InvalidKey {
        /// Principal with the bad key
        principal: PrincipalId,
    },

    /// Signature does not match the digest and key
    #[error("signature does not verify")]
    BadSignature,

    /// Fewer member signatures than the quorum requires
    #[error("threshold requires {required} signers, credential carries {provided}")]
    InsufficientSigners {
        /// Configured quorum
        required: usize,
        /// Entries present in the credential
        provided: usize,
    },

    /// Member entries are duplicated or not strictly ascending
    #[error("member signature at position {position} is out of canonical order")]
    NonCanonicalOrder {
        /// Position of the first offending entry
        position: usize,
    },

    /// Entry names a principal outside the group
    #[error("{member} is not a member of the signing group")]
    UnknownMember {
        /// Offending principal
        member: PrincipalId,
    },

    /// Nested group verification went deeper than allowed
    #[error("signer nesting exceeds maximum depth {max}")]
    DepthExceeded {
        /// Configured maximum depth
        max: usize,
    },

    /// Group configuration cannot ever be satisfied or is trivially satisfied
    #[error("threshold {threshold} is invalid for a group of {members}")]
    InvalidThreshold {
        /// Requested quorum
        threshold: usize,
        /// Group size
        members: usize,
    },
}

/// Verify that `credential` proves `principal` authorized `digest`.
///
/// Implementations resolve the principal to its signing scheme. Group schemes
/// recurse into their members with a bounded depth.
pub trait SignatureVerifier: Send + Sync + std::fmt::Debug {
    /// Verify with a diagnostic on failure
    fn verify_signature(
        &self,
        principal: &PrincipalId,
        digest: &Hash32,
        credential: &[u8],
    ) -> Result<(), SignatureError>;

    /// Boolean form of [`SignatureVerifier::verify_signature`]
    fn is_valid_signature(&self, principal: &PrincipalId, digest: &Hash32, credential: &[u8]) -> bool {
        self.verify_signature(principal, digest, credential).is_ok()
    }
}
