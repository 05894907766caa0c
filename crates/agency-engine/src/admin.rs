//! Administrative state: pause switch and two-step ownership transfer
//!
//! Lifecycle: active ⇄ paused, owner-only. Ownership moves only when the
//! proposed owner accepts; until then the current owner keeps every right
//! and may cancel the proposal.

use agency_core::{AgencyError, AgencyResult, PrincipalId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Owner, pending owner and pause flag of one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminState {
    owner: PrincipalId,
    pending_owner: Option<PrincipalId>,
    paused: bool,
}

impl AdminState {
    /// Active engine owned by `owner`
    pub fn new(owner: PrincipalId) -> Self {
        Self {
            owner,
            pending_owner: None,
            paused: false,
        }
    }

    /// Current owner
    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    /// Proposed owner awaiting acceptance
    pub fn pending_owner(&self) -> Option<PrincipalId> {
        self.pending_owner
    }

    /// Whether the engine is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail with `Paused` while paused
    pub fn ensure_not_paused(&self) -> AgencyResult<()> {
        if self.paused {
            return Err(AgencyError::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: &PrincipalId) -> AgencyResult<()> {
        if *caller != self.owner {
            return Err(AgencyError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Pause the engine.
    pub fn pause(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.ensure_owner(caller)?;
        self.ensure_not_paused()?;
        self.paused = true;
        info!(owner = %caller, "Engine paused");
        Ok(())
    }

    /// Resume the engine.
    pub fn unpause(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(AgencyError::NotPaused);
        }
        self.paused = false;
        info!(owner = %caller, "Engine unpaused");
        Ok(())
    }

    /// Propose `new_owner`. Replaces any earlier proposal.
    pub fn transfer_ownership(&mut self, caller: &PrincipalId, new_owner: PrincipalId) -> AgencyResult<()> {
        self.ensure_owner(caller)?;
        self.pending_owner = Some(new_owner);
        info!(owner = %caller, pending_owner = %new_owner, "Ownership transfer started");
        Ok(())
    }

    /// Accept a pending transfer. Returns the previous owner.
    pub fn accept_ownership(&mut self, caller: &PrincipalId) -> AgencyResult<PrincipalId> {
        let pending = self.pending_owner.ok_or(AgencyError::NoPendingOwner)?;
        if *caller != pending {
            return Err(AgencyError::Unauthorized { caller: *caller });
        }
        let previous = std::mem::replace(&mut self.owner, pending);
        self.pending_owner = None;
        info!(previous_owner = %previous, owner = %pending, "Ownership transferred");
        Ok(previous)
    }

    /// Withdraw a pending proposal.
    pub fn cancel_transfer(&mut self, caller: &PrincipalId) -> AgencyResult<()> {
        self.ensure_owner(caller)?;
        if self.pending_owner.take().is_none() {
            return Err(AgencyError::NoPendingOwner);
        }
        info!(owner = %caller, "Ownership transfer cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn owner() -> PrincipalId {
        PrincipalId::derive("owner")
    }

    fn successor() -> PrincipalId {
        PrincipalId::derive("successor")
    }

    #[test]
    fn test_pause_lifecycle() {
        let mut admin = AdminState::new(owner());
        assert!(admin.ensure_not_paused().is_ok());
        admin.pause(&owner()).unwrap();
        assert_matches!(admin.ensure_not_paused(), Err(AgencyError::Paused));
        assert_matches!(admin.pause(&owner()), Err(AgencyError::Paused));
        admin.unpause(&owner()).unwrap();
        assert_matches!(admin.unpause(&owner()), Err(AgencyError::NotPaused));
    }

    #[test]
    fn test_non_owner_cannot_pause() {
        let mut admin = AdminState::new(owner());
        assert_matches!(
            admin.pause(&successor()),
            Err(AgencyError::Unauthorized { caller }) if caller == successor()
        );
        assert!(!admin.is_paused());
    }

    #[test]
    fn test_transfer_requires_acceptance() {
        let mut admin = AdminState::new(owner());
        admin.transfer_ownership(&owner(), successor()).unwrap();
        assert_eq!(admin.owner(), owner());
        assert_eq!(admin.pending_owner(), Some(successor()));

        // Old owner keeps rights until acceptance.
        admin.pause(&owner()).unwrap();
        assert_matches!(admin.unpause(&successor()), Err(AgencyError::Unauthorized { .. }));

        assert_matches!(
            admin.accept_ownership(&PrincipalId::derive("mallory")),
            Err(AgencyError::Unauthorized { .. })
        );
        assert_eq!(admin.accept_ownership(&successor()).unwrap(), owner());
        assert_eq!(admin.owner(), successor());
        assert_eq!(admin.pending_owner(), None);

        assert_matches!(admin.unpause(&owner()), Err(AgencyError::Unauthorized { .. }));
        admin.unpause(&successor()).unwrap();
    }

    #[test]
    fn test_accept_without_proposal() {
        let mut admin = AdminState::new(owner());
        assert_matches!(admin.accept_ownership(&successor()), Err(AgencyError::NoPendingOwner));
    }

    #[test]
    fn test_cancel_transfer() {
        let mut admin = AdminState::new(owner());
        admin.transfer_ownership(&owner(), successor()).unwrap();
        assert_matches!(admin.cancel_transfer(&successor()), Err(AgencyError::Unauthorized { .. }));
        admin.cancel_transfer(&owner()).unwrap();
        assert_matches!(admin.accept_ownership(&successor()), Err(AgencyError::NoPendingOwner));
        assert_matches!(admin.cancel_transfer(&owner()), Err(AgencyError::NoPendingOwner));
    }
}
