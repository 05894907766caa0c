//! Core identifier types
//!
//! Principals are 32-byte addresses. Delegation and caveat identifiers are
//! content addresses produced by the canonical hasher in [`crate::hash`].

use crate::hash::{CanonicalHasher, Hash32};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of a principal (delegator, delegate, enforcer, action target).
///
/// The engine never inspects how a principal stores its keys; the address is
/// resolved to a verification scheme by the signer directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PrincipalId(pub [u8; 32]);

impl PrincipalId {
    /// Derive a stable address from a human-readable label.
    pub fn derive(label: &str) -> Self {
        Self(
            CanonicalHasher::new("agency.principal.label")
                .bytes(label.as_bytes())
                .finish()
                .0,
        )
    }

    /// Address of a single-key signer, derived from its verifying key.
    pub fn from_verifying_key(key: &[u8; 32]) -> Self {
        Self(CanonicalHasher::new("agency.principal.key").fixed32(key).finish().0)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrincipalId(0x{})", &hex::encode(self.0)[..12])
    }
}

impl FromStr for PrincipalId {
    type Err = crate::AgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| crate::AgencyError::config(format!("invalid principal hex: {e}")))?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            crate::AgencyError::config("principal address must be 32 bytes".to_string())
        })?;
        Ok(Self(array))
    }
}

impl From<[u8; 32]> for PrincipalId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Content address of a delegation's terms (every field except the signature)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DelegationId(pub Hash32);

impl DelegationId {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for DelegationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delegation-{}", &self.0.to_hex()[..16])
    }
}

impl fmt::Debug for DelegationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelegationId({})", &self.0.to_hex()[..16])
    }
}

impl From<Hash32> for DelegationId {
    fn from(hash: Hash32) -> Self {
        Self(hash)
    }
}

/// Content address of a caveat (enforcer and terms, never args)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaveatHash(pub Hash32);

impl fmt::Display for CaveatHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caveat-{}", &self.0.to_hex()[..16])
    }
}
