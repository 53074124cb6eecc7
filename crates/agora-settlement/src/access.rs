//! Administrative capability check.
//!
//! A single owner identity, set at construction, gates fee configuration
//! and dispute arbitration. The capability is orthogonal to buyer/seller
//! identity — the owner need not participate in trades, and ordinary
//! trading never consults this gate.

use agora_types::{AgentId, AgoraError, Result};

/// Owner lookup + check, performed at the start of each administrative
/// operation.
#[derive(Debug, Clone, Copy)]
pub struct OwnerGate {
    owner: AgentId,
}

impl OwnerGate {
    /// # Errors
    /// Rejects the nil address.
    pub fn new(owner: AgentId) -> Result<Self> {
        if owner.is_nil() {
            return Err(AgoraError::NilAddress);
        }
        Ok(Self { owner })
    }

    /// The current owner.
    #[must_use]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    /// Fail unless `caller` is the current owner.
    pub fn require(&self, caller: &AgentId) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(AgoraError::NotOwner)
        }
    }

    /// Hand the capability to `new_owner`. Returns the previous owner.
    pub fn transfer(&mut self, caller: &AgentId, new_owner: AgentId) -> Result<AgentId> {
        self.require(caller)?;
        if new_owner.is_nil() {
            return Err(AgoraError::NilAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes_gate() {
        let owner = AgentId::new();
        let gate = OwnerGate::new(owner).unwrap();
        assert!(gate.require(&owner).is_ok());
    }

    #[test]
    fn non_owner_rejected() {
        let gate = OwnerGate::new(AgentId::new()).unwrap();
        let err = gate.require(&AgentId::new()).unwrap_err();
        assert!(matches!(err, AgoraError::NotOwner));
    }

    #[test]
    fn nil_owner_rejected() {
        assert!(matches!(
            OwnerGate::new(AgentId::nil()).unwrap_err(),
            AgoraError::NilAddress
        ));
    }

    #[test]
    fn transfer_moves_capability() {
        let first = AgentId::new();
        let second = AgentId::new();
        let mut gate = OwnerGate::new(first).unwrap();

        let previous = gate.transfer(&first, second).unwrap();
        assert_eq!(previous, first);
        assert_eq!(gate.owner(), second);
        assert!(gate.require(&first).is_err());
        assert!(gate.require(&second).is_ok());
    }

    #[test]
    fn only_owner_can_transfer() {
        let mut gate = OwnerGate::new(AgentId::new()).unwrap();
        let err = gate.transfer(&AgentId::new(), AgentId::new()).unwrap_err();
        assert!(matches!(err, AgoraError::NotOwner));
    }

    #[test]
    fn transfer_to_nil_rejected() {
        let owner = AgentId::new();
        let mut gate = OwnerGate::new(owner).unwrap();
        let err = gate.transfer(&owner, AgentId::nil()).unwrap_err();
        assert!(matches!(err, AgoraError::NilAddress));
    }
}
