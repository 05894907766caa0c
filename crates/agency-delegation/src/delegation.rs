//! Delegation and caveat records
//!
//! A delegation is addressed by the digest of its terms. The signature is
//! not part of the terms: re-signing a grant does not change which grant it
//! is. Caveat args are likewise excluded, since the redeemer supplies them.

use agency_core::{CanonicalHasher, CaveatHash, DelegationId, DomainSeparator, Hash32, PrincipalId};
use serde::{Deserialize, Serialize};

/// Who may exercise a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delegate {
    /// Any redeemer
    Any,
    /// One specific principal
    Principal(PrincipalId),
}

impl Delegate {
    /// Whether `principal` may act under this delegate value
    pub fn admits(&self, principal: &PrincipalId) -> bool {
        match self {
            Delegate::Any => true,
            Delegate::Principal(p) => p == principal,
        }
    }
}

impl From<PrincipalId> for Delegate {
    fn from(principal: PrincipalId) -> Self {
        Delegate::Principal(principal)
    }
}

/// Where a grant's authority comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    /// Root grant with no parent
    Root,
    /// Issued under the referenced parent grant
    Parent(DelegationId),
}

/// Policy obligation attached to a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    /// Address of the enforcer that evaluates this caveat
    pub enforcer: PrincipalId,
    /// Delegator-signed configuration
    #[serde(with = "serde_bytes")]
    pub terms: Vec<u8>,
    /// Redeemer-supplied parameters, not covered by the signature
    #[serde(with = "serde_bytes")]
    pub args: Vec<u8>,
}

impl Caveat {
    /// Caveat with empty args
    pub fn new(enforcer: PrincipalId, terms: impl Into<Vec<u8>>) -> Self {
        Self {
            enforcer,
            terms: terms.into(),
            args: Vec::new(),
        }
    }

    /// Replace the redemption-time args
    pub fn with_args(mut self, args: impl Into<Vec<u8>>) -> Self {
        self.args = args.into();
        self
    }

    /// Content address over enforcer and terms.
    pub fn hash(&self) -> CaveatHash {
        CaveatHash(
            CanonicalHasher::new("agency.caveat.v1")
                .fixed32(self.enforcer.as_bytes())
                .bytes(&self.terms)
                .finish(),
        )
    }
}

/// Signed capability grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Principal allowed to exercise the grant
    pub delegate: Delegate,
    /// Grantor
    pub delegator: PrincipalId,
    /// Root marker or parent grant
    pub authority: Authority,
    /// Ordered policy obligations
    pub caveats: Vec<Caveat>,
    /// Disambiguator for otherwise identical grants
    pub salt: u64,
    /// Delegator's credential over the signing digest; empty for grants approved on-engine
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl Delegation {
    /// Identifier over every field except `signature`.
    pub fn id(&self) -> DelegationId {
        let mut h = CanonicalHasher::new("agency.delegation.v1");
        h = match &self.delegate {
            Delegate::Any => h.tag_byte(0),
            Delegate::Principal(p) => h.tag_byte(1).fixed32(p.as_bytes()),
        };
        h = h.fixed32(self.delegator.as_bytes());
        h = match &self.authority {
            Authority::Root => h.tag_byte(0),
            Authority::Parent(parent) => h.tag_byte(1).fixed32(parent.as_bytes()),
        };
        h = h.u64(self.caveats.len() as u64);
        for caveat in &self.caveats {
            h = h.fixed32(caveat.hash().0.as_bytes());
        }
        DelegationId(h.u64(self.salt).finish())
    }

    /// Digest the delegator signs under `domain`
    pub fn signing_digest(&self, domain: &DomainSeparator) -> Hash32 {
        domain.signing_digest(&self.id())
    }
}
