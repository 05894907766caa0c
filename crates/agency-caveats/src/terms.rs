//! Single-pass decoding of caveat terms
//!
//! Every decoder reads its input once. List decoders keep a hash set for
//! lookups, so checking `n` calls against `k` entries costs `O(k + n)`.

use crate::enforcer::CaveatError;
use agency_core::{Action, PrincipalId};
use std::collections::HashSet;

/// Decode an exact-width big-endian `u128`.
pub fn decode_u128(terms: &[u8]) -> Result<u128, CaveatError> {
    let bytes: [u8; 16] = terms
        .try_into()
        .map_err(|_| invalid_length("u128 terms", 16, terms.len()))?;
    Ok(u128::from_be_bytes(bytes))
}

/// Decode an exact-width big-endian `u64`.
pub fn decode_u64(terms: &[u8]) -> Result<u64, CaveatError> {
    let bytes: [u8; 8] = terms
        .try_into()
        .map_err(|_| invalid_length("u64 terms", 8, terms.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Decode two big-endian `u64` values packed back to back.
pub fn decode_u64_pair(terms: &[u8]) -> Result<(u64, u64), CaveatError> {
    if terms.len() != 16 {
        return Err(invalid_length("u64 pair terms", 16, terms.len()));
    }
    let (first, second) = terms.split_at(8);
    Ok((decode_u64(first)?, decode_u64(second)?))
}

fn invalid_length(what: &str, expected: usize, actual: usize) -> CaveatError {
    CaveatError::new(format!("invalid-terms-length: {what} must be {expected} bytes, got {actual}"))
}

/// Set of fixed-width entries decoded from concatenated terms.
#[derive(Debug, Clone)]
pub struct EntrySet<const N: usize> {
    entries: HashSet<[u8; N]>,
    scanned: usize,
}

impl<const N: usize> EntrySet<N> {
    /// Parse concatenated `N`-byte entries.
    pub fn parse(terms: &[u8]) -> Result<Self, CaveatError> {
        if terms.is_empty() || terms.len() % N != 0 {
            return Err(CaveatError::new(format!(
                "invalid-terms-length: expected a non-empty multiple of {N} bytes, got {}",
                terms.len()
            )));
        }
        let mut entries = HashSet::with_capacity(terms.len() / N);
        let mut scanned = 0;
        for chunk in terms.chunks_exact(N) {
            let mut entry = [0u8; N];
            entry.copy_from_slice(chunk);
            entries.insert(entry);
            scanned += 1;
        }
        Ok(Self { entries, scanned })
    }

    /// Whether `entry` is listed
    pub fn contains(&self, entry: &[u8; N]) -> bool {
        self.entries.contains(entry)
    }

    /// Entries read from the terms, duplicates included
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Distinct entries
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }
}

/// Listed principals (32-byte entries).
#[derive(Debug, Clone)]
pub struct PrincipalList(EntrySet<32>);

impl PrincipalList {
    /// Parse concatenated principal addresses
    pub fn parse(terms: &[u8]) -> Result<Self, CaveatError> {
        EntrySet::parse(terms).map(Self)
    }

    /// Encode principals as terms
    pub fn encode<'a>(principals: impl IntoIterator<Item = &'a PrincipalId>) -> Vec<u8> {
        principals
            .into_iter()
            .flat_map(|p| p.as_bytes().iter().copied())
            .collect()
    }

    /// Whether `principal` is listed
    pub fn contains(&self, principal: &PrincipalId) -> bool {
        self.0.contains(principal.as_bytes())
    }

    /// Entries read from the terms, duplicates included
    pub fn scanned(&self) -> usize {
        self.0.scanned()
    }

    /// Distinct principals
    pub fn distinct(&self) -> usize {
        self.0.distinct()
    }
}

/// Listed method selectors (4-byte entries).
#[derive(Debug, Clone)]
pub struct SelectorList(EntrySet<4>);

impl SelectorList {
    /// Parse concatenated selectors
    pub fn parse(terms: &[u8]) -> Result<Self, CaveatError> {
        EntrySet::parse(terms).map(Self)
    }

    /// Whether `selector` is listed
    pub fn contains(&self, selector: &[u8; 4]) -> bool {
        self.0.contains(selector)
    }

    /// Entries read from the terms, duplicates included
    pub fn scanned(&self) -> usize {
        self.0.scanned()
    }
}

/// Canonical terms encoding of a single action: target ‖ value ‖ payload.
pub fn encode_action(action: &Action) -> Vec<u8> {
    let mut out = Vec::with_capacity(48 + action.payload.len());
    out.extend_from_slice(action.target.as_bytes());
    out.extend_from_slice(&action.value.to_be_bytes());
    out.extend_from_slice(&action.payload);
    out
}

/// Inverse of [`encode_action`].
pub fn decode_action(terms: &[u8]) -> Result<Action, CaveatError> {
    if terms.len() < 48 {
        return Err(CaveatError::new(format!(
            "invalid-terms-length: action terms need at least 48 bytes, got {}",
            terms.len()
        )));
    }
    let (target, rest) = terms.split_at(32);
    let (value, payload) = rest.split_at(16);
    let mut address = [0u8; 32];
    address.copy_from_slice(target);
    Ok(Action::new(PrincipalId::from_bytes(address), decode_u128(value)?, payload.to_vec()))
}
