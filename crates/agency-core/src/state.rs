//! Journaled key-value state with nested checkpoints
//!
//! Everything a redemption call writes (caveat counters, dispatcher-side
//! balances and target storage) lives in one [`StateStore`]. Writes made while
//! a checkpoint is open are recorded in an undo log so that the call can be
//! unwound as a unit, and so that a single failure-tolerant action can be
//! unwound without touching the surrounding bookkeeping.
//!
//! Checkpoints nest. Committing an inner checkpoint keeps its undo entries
//! alive for any enclosing checkpoint; the log is dropped only when the
//! outermost checkpoint commits.

use crate::identifiers::PrincipalId;
use std::collections::BTreeMap;

/// Errors from checkpoint misuse or malformed stored values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Checkpoint was already resolved by an enclosing revert or commit
    #[error("checkpoint at depth {depth} is no longer open")]
    StaleCheckpoint {
        /// Depth of the stale checkpoint
        depth: usize,
    },

    /// Stored value does not have the width the reader expected
    #[error("slot holds {actual} bytes, expected {expected}")]
    MalformedValue {
        /// Expected byte width
        expected: usize,
        /// Actual byte width
        actual: usize,
    },
}

/// Storage key: a slot inside one owner's namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey {
    /// Principal owning the slot (an enforcer, an account, a target)
    pub owner: PrincipalId,
    /// Owner-defined slot name
    pub slot: Vec<u8>,
}

#[derive(Debug, Clone)]
struct UndoEntry {
    key: StateKey,
    previous: Option<Vec<u8>>,
}

/// Handle to an open checkpoint. Consumed by [`StateStore::revert`] or
/// [`StateStore::commit`].
#[derive(Debug)]
#[must_use = "an open checkpoint must be reverted or committed"]
pub struct Checkpoint {
    depth: usize,
}

impl Checkpoint {
    /// Nesting depth (0 is outermost)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Journaled state store.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    entries: BTreeMap<StateKey, Vec<u8>>,
    undo: Vec<UndoEntry>,
    marks: Vec<usize>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot
    pub fn get(&self, owner: &PrincipalId, slot: &[u8]) -> Option<&[u8]> {
        let key = StateKey {
            owner: *owner,
            slot: slot.to_vec(),
        };
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Write a slot
    pub fn set(&mut self, owner: PrincipalId, slot: &[u8], value: Vec<u8>) {
        let key = StateKey {
            owner,
            slot: slot.to_vec(),
        };
        let previous = self.entries.insert(key.clone(), value);
        self.record(key, previous);
    }

    /// Delete a slot
    pub fn remove(&mut self, owner: PrincipalId, slot: &[u8]) -> Option<Vec<u8>> {
        let key = StateKey {
            owner,
            slot: slot.to_vec(),
        };
        let previous = self.entries.remove(&key);
        if previous.is_some() {
            self.record(key, previous.clone());
        }
        previous
    }

    /// Read a big-endian `u128` slot; missing slots read as zero.
    pub fn get_u128(&self, owner: &PrincipalId, slot: &[u8]) -> Result<u128, StateError> {
        match self.get(owner, slot) {
            None => Ok(0),
            Some(bytes) => {
                let array: [u8; 16] =
                    bytes
                        .try_into()
                        .map_err(|_| StateError::MalformedValue {
                            expected: 16,
                            actual: bytes.len(),
                        })?;
                Ok(u128::from_be_bytes(array))
            }
        }
    }

    /// Write a big-endian `u128` slot
    pub fn set_u128(&mut self, owner: PrincipalId, slot: &[u8], value: u128) {
        self.set(owner, slot, value.to_be_bytes().to_vec());
    }

    /// Number of stored slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no slots
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of currently open checkpoints
    pub fn open_checkpoints(&self) -> usize {
        self.marks.len()
    }

    /// Open a checkpoint.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.marks.push(self.undo.len());
        Checkpoint {
            depth: self.marks.len() - 1,
        }
    }

    /// Undo every write made since `checkpoint` was opened, including writes
    /// under nested checkpoints, and close it.
    pub fn revert(&mut self, checkpoint: Checkpoint) -> Result<(), StateError> {
        let mark = self.mark_of(&checkpoint)?;
        while self.undo.len() > mark {
            let Some(entry) = self.undo.pop() else { break };
            match entry.previous {
                Some(value) => {
                    self.entries.insert(entry.key, value);
                }
                None => {
                    self.entries.remove(&entry.key);
                }
            }
        }
        self.marks.truncate(checkpoint.depth);
        Ok(())
    }

    /// Keep every write made since `checkpoint` was opened, and close it.
    pub fn commit(&mut self, checkpoint: Checkpoint) -> Result<(), StateError> {
        self.mark_of(&checkpoint)?;
        self.marks.truncate(checkpoint.depth);
        if self.marks.is_empty() {
            self.undo.clear();
        }
        Ok(())
    }

    fn mark_of(&self, checkpoint: &Checkpoint) -> Result<usize, StateError> {
        self.marks
            .get(checkpoint.depth)
            .copied()
            .ok_or(StateError::StaleCheckpoint {
                depth: checkpoint.depth,
            })
    }

    fn record(&mut self, key: StateKey, previous: Option<Vec<u8>>) {
        if !self.marks.is_empty() {
            self.undo.push(UndoEntry { key, previous });
        }
    }
}

/// View of a [`StateStore`] restricted to one owner's slots.
pub struct ScopedState<'a> {
    owner: PrincipalId,
    store: &'a mut StateStore,
}

impl<'a> ScopedState<'a> {
    /// Restrict `store` to `owner`
    pub fn new(owner: PrincipalId, store: &'a mut StateStore) -> Self {
        Self { owner, store }
    }

    /// Owner of the visible slots
    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    /// Read a slot
    pub fn get(&self, slot: &[u8]) -> Option<&[u8]> {
        self.store.get(&self.owner, slot)
    }

    /// Write a slot
    pub fn set(&mut self, slot: &[u8], value: Vec<u8>) {
        self.store.set(self.owner, slot, value);
    }

    /// Read a `u128` slot (zero when unset)
    pub fn get_u128(&self, slot: &[u8]) -> Result<u128, StateError> {
        self.store.get_u128(&self.owner, slot)
    }

    /// Write a `u128` slot
    pub fn set_u128(&mut self, slot: &[u8], value: u128) {
        self.store.set_u128(self.owner, slot, value);
    }
}
