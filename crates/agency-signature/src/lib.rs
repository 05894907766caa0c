//! Agency Signature - signer verification for delegation redemption
//!
//! Principals resolve to a [`SignerKind`] through the [`SignerDirectory`].
//! Single-key principals verify an Ed25519 signature; threshold principals
//! verify a canonical list of member credentials, recursively and with a
//! bounded depth.

#![forbid(unsafe_code)]

/// Principal → signing scheme directory
pub mod directory;

/// Ed25519 single-key credentials
pub mod ed25519;

/// Threshold group credentials
pub mod threshold;

/// Verification capability trait
pub mod verifier;

pub use directory::{SignerDirectory, SignerKind, DEFAULT_MAX_SIGNER_DEPTH};
pub use ed25519::{principal_of, sign_digest, SIGNATURE_LENGTH};
pub use threshold::{MemberSignature, ThresholdCredential};
pub use verifier::{SignatureError, SignatureVerifier};
