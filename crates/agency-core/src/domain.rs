//! Domain separation for signed delegation digests
//!
//! Every signature a delegator produces covers the delegation identifier mixed
//! with the engine instance's domain value. The domain value commits to the
//! engine's name, its version, the network it runs on and its own address, so
//! a signature made for one engine instance (or one engine version) does not
//! verify against any other.

use crate::hash::{CanonicalHasher, Hash32};
use crate::identifiers::{DelegationId, PrincipalId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix bytes of every signing digest.
pub const SIGNING_PREFIX: [u8; 2] = [0x19, 0x01];

/// Inputs that identify one engine deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainParams {
    /// Engine name
    pub name: String,
    /// Engine version; bumping it invalidates signatures made under the prior version
    pub version: String,
    /// Network or chain identifier of the deployment
    pub network_id: u64,
    /// Address of the engine instance itself
    pub engine_address: PrincipalId,
}

/// Stable per-instance domain value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainSeparator(Hash32);

impl DomainSeparator {
    /// Compute the domain value for a deployment.
    pub fn new(params: &DomainParams) -> Self {
        let digest = CanonicalHasher::new("agency.domain.v1")
            .bytes(params.name.as_bytes())
            .bytes(params.version.as_bytes())
            .u64(params.network_id)
            .fixed32(params.engine_address.as_bytes())
            .finish();
        Self(digest)
    }

    /// Wrap a precomputed domain value.
    pub fn from_hash(hash: Hash32) -> Self {
        Self(hash)
    }

    /// Underlying digest.
    pub fn as_hash(&self) -> Hash32 {
        self.0
    }

    /// Message hash a delegator signs for the given delegation.
    pub fn signing_digest(&self, id: &DelegationId) -> Hash32 {
        let mut h = crate::hash::hasher();
        h.update(&SIGNING_PREFIX);
        h.update(self.0.as_bytes());
        h.update(id.as_bytes());
        Hash32(h.finalize())
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainSeparator({})", &self.0.to_hex()[..16])
    }
}

impl fmt::Display for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DomainParams {
        DomainParams {
            name: "DelegationManager".into(),
            version: "1".into(),
            network_id: 1,
            engine_address: PrincipalId::derive("engine"),
        }
    }

    #[test]
    fn test_every_input_changes_the_domain() {
        let base = DomainSeparator::new(&params());

        let mut p = params();
        p.name = "Other".into();
        assert_ne!(DomainSeparator::new(&p), base);

        let mut p = params();
        p.version = "2".into();
        assert_ne!(DomainSeparator::new(&p), base);

        let mut p = params();
        p.network_id = 10;
        assert_ne!(DomainSeparator::new(&p), base);

        let mut p = params();
        p.engine_address = PrincipalId::derive("engine-2");
        assert_ne!(DomainSeparator::new(&p), base);
    }

    #[test]
    fn test_signing_digest_depends_on_domain() {
        let id = DelegationId(Hash32([3u8; 32]));
        let d1 = DomainSeparator::new(&params());
        let mut p = params();
        p.version = "2".into();
        let d2 = DomainSeparator::new(&p);
        assert_ne!(d1.signing_digest(&id), d2.signing_digest(&id));
        assert_eq!(d1.signing_digest(&id), d1.signing_digest(&id));
    }
}
