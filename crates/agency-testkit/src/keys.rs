//! Deterministic signing keys for tests
//!
//! Every fixture is derived from a seed, so principal addresses and
//! signatures are reproducible across runs.

use agency_core::{DomainSeparator, Hash32, PrincipalId};
use agency_delegation::Delegation;
use agency_signature::{principal_of, sign_digest, MemberSignature, SignerDirectory};
use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};

/// Single-key signer fixture.
#[derive(Debug, Clone)]
pub struct KeyTestFixture {
    signing_key: SigningKey,
    principal: PrincipalId,
}

impl KeyTestFixture {
    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let principal = principal_of(&signing_key);
        Self {
            signing_key,
            principal,
        }
    }

    /// Create from a seed string
    pub fn from_seed_string(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self::from_seed(&digest)
    }

    /// Signer address
    pub fn principal(&self) -> PrincipalId {
        self.principal
    }

    /// Signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Raw verifying key bytes
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Register this key in a signer directory
    pub fn register(&self, directory: &SignerDirectory) -> PrincipalId {
        directory.register_ed25519(self.verifying_key_bytes())
    }

    /// Credential over a digest
    pub fn sign_digest(&self, digest: &Hash32) -> Vec<u8> {
        sign_digest(&self.signing_key, digest)
    }

    /// Sign a delegation under `domain`, replacing any previous signature
    pub fn sign_delegation(&self, mut delegation: Delegation, domain: &DomainSeparator) -> Delegation {
        delegation.signature = self.sign_digest(&delegation.signing_digest(domain));
        delegation
    }

    /// Member entry for a threshold credential
    pub fn member_signature(&self, digest: &Hash32) -> MemberSignature {
        MemberSignature {
            signer: self.principal,
            credential: self.sign_digest(digest),
        }
    }
}

/// Deterministic key set sharing a base seed.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: Vec<KeyTestFixture>,
}

impl KeySet {
    /// `count` keys derived from `base_seed`
    pub fn new(base_seed: &str, count: usize) -> Self {
        Self {
            keys: (0..count)
                .map(|i| KeyTestFixture::from_seed_string(&format!("{base_seed}-{i}")))
                .collect(),
        }
    }

    /// Register every key in a directory
    pub fn register_all(&self, directory: &SignerDirectory) {
        for key in &self.keys {
            key.register(directory);
        }
    }

    /// Key at `index`
    pub fn get(&self, index: usize) -> Option<&KeyTestFixture> {
        self.keys.get(index)
    }

    /// All keys
    pub fn keys(&self) -> &[KeyTestFixture] {
        &self.keys
    }

    /// Principals of all keys
    pub fn principals(&self) -> Vec<PrincipalId> {
        self.keys.iter().map(KeyTestFixture::principal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_string_is_deterministic() {
        assert_eq!(
            KeyTestFixture::from_seed_string("alice").principal(),
            KeyTestFixture::from_seed_string("alice").principal()
        );
        assert_ne!(
            KeyTestFixture::from_seed_string("alice").principal(),
            KeyTestFixture::from_seed_string("bob").principal()
        );
    }

    #[test]
    fn test_key_set_members_are_distinct() {
        let set = KeySet::new("group", 3);
        let mut principals = set.principals();
        principals.sort();
        principals.dedup();
        assert_eq!(principals.len(), 3);
    }
}
