//! Single-key Ed25519 signing and verification
//!
//! For 1-of-1 principals a credential is the raw 64-byte Ed25519 signature
//! over the 32-byte signing digest. Verification is strict (rejects
//! non-canonical encodings and small-order keys).

use crate::verifier::SignatureError;
use agency_core::{Hash32, PrincipalId};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// Length of an Ed25519 credential.
pub const SIGNATURE_LENGTH: usize = 64;

/// Verify a single-key credential.
pub fn verify(
    principal: &PrincipalId,
    verifying_key: &[u8; 32],
    digest: &Hash32,
    credential: &[u8],
) -> Result<(), SignatureError> {
    if credential.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::Malformed {
            reason: format!(
                "ed25519 credential must be {SIGNATURE_LENGTH} bytes, got {}",
                credential.len()
            ),
        });
    }
    let key = VerifyingKey::from_bytes(verifying_key).map_err(|_| SignatureError::InvalidKey {
        principal: *principal,
    })?;
    let signature = Signature::from_slice(credential).map_err(|e| SignatureError::Malformed {
        reason: e.to_string(),
    })?;
    key.verify_strict(digest.as_bytes(), &signature)
        .map_err(|_| SignatureError::BadSignature)
}

/// Produce a single-key credential over `digest`.
pub fn sign_digest(signing_key: &SigningKey, digest: &Hash32) -> Vec<u8> {
    signing_key.sign(digest.as_bytes()).to_bytes().to_vec()
}

/// Address of the principal controlled by `signing_key`.
pub fn principal_of(signing_key: &SigningKey) -> PrincipalId {
    PrincipalId::from_verifying_key(signing_key.verifying_key().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    #[test]
    fn test_sign_then_verify() {
        let sk = key();
        let digest = Hash32([1u8; 32]);
        let credential = sign_digest(&sk, &digest);
        let vk = sk.verifying_key().to_bytes();
        assert!(verify(&principal_of(&sk), &vk, &digest, &credential).is_ok());
    }

    #[test]
    fn test_wrong_digest_is_rejected() {
        let sk = key();
        let credential = sign_digest(&sk, &Hash32([1u8; 32]));
        let vk = sk.verifying_key().to_bytes();
        assert_matches!(
            verify(&principal_of(&sk), &vk, &Hash32([2u8; 32]), &credential),
            Err(SignatureError::BadSignature)
        );
    }

    #[test]
    fn test_truncated_credential_is_malformed() {
        let vk = key().verifying_key().to_bytes();
        assert_matches!(
            verify(&PrincipalId::default(), &vk, &Hash32::ZERO, &[0u8; 10]),
            Err(SignatureError::Malformed { .. })
        );
    }
}
