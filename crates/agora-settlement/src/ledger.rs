//! The fund-transfer boundary.
//!
//! The engine never touches balances directly: purchase pulls funds into
//! custody through [`Ledger::collect`], and settlement/arbitration pushes
//! them out through [`Ledger::payout`]. `payout` is all-or-nothing by
//! contract — an implementation that cannot apply every leg must apply
//! none and return a transfer error, which the engine treats as fatal and
//! rolls its bookkeeping back against.

use std::collections::{HashMap, HashSet};

use agora_types::{AgentId, AgoraError, Result};

/// Moves value between participants and the engine's custody.
pub trait Ledger {
    /// Pull `amount` from `from` into custody. Nothing moves on error.
    fn collect(&mut self, from: &AgentId, amount: u64) -> Result<()>;

    /// Release custody to the given recipients. All legs apply or none
    /// do; on error custody and every balance are unchanged.
    fn payout(&mut self, transfers: &[(AgentId, u64)]) -> Result<()>;
}

/// In-memory ledger: per-agent available balances plus a custody pool.
///
/// Accounts can be placed on hold (`suspend`), after which they cannot
/// receive payouts — the failure mode that exercises the engine's
/// rollback path. Collection from a held account still works; holds gate
/// outbound credits only.
#[derive(Debug, Default)]
pub struct VaultLedger {
    available: HashMap<AgentId, u64>,
    custody: u64,
    held: HashSet<AgentId>,
}

impl VaultLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an agent's available balance (funding boundary).
    pub fn deposit(&mut self, agent: AgentId, amount: u64) {
        *self.available.entry(agent).or_insert(0) += amount;
    }

    /// An agent's available balance.
    #[must_use]
    pub fn balance(&self, agent: &AgentId) -> u64 {
        self.available.get(agent).copied().unwrap_or(0)
    }

    /// Total value currently locked in custody.
    #[must_use]
    pub fn custody(&self) -> u64 {
        self.custody
    }

    /// Place a compliance hold: the agent can no longer receive payouts.
    pub fn suspend(&mut self, agent: AgentId) {
        self.held.insert(agent);
    }

    /// Lift a hold.
    pub fn reinstate(&mut self, agent: &AgentId) {
        self.held.remove(agent);
    }

    #[must_use]
    pub fn is_held(&self, agent: &AgentId) -> bool {
        self.held.contains(agent)
    }
}

impl Ledger for VaultLedger {
    fn collect(&mut self, from: &AgentId, amount: u64) -> Result<()> {
        let balance = self.available.entry(*from).or_insert(0);
        if *balance < amount {
            return Err(AgoraError::InsufficientFunds {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        self.custody += amount;
        Ok(())
    }

    fn payout(&mut self, transfers: &[(AgentId, u64)]) -> Result<()> {
        // Validate every leg before mutating anything.
        let total: u64 = transfers.iter().map(|(_, amount)| amount).sum();
        if total > self.custody {
            return Err(AgoraError::TransferRejected {
                reason: format!("payout {total} exceeds custody {}", self.custody),
            });
        }
        for (recipient, _) in transfers {
            if self.held.contains(recipient) {
                return Err(AgoraError::TransferRejected {
                    reason: format!("recipient {recipient} is on hold"),
                });
            }
        }

        for (recipient, amount) in transfers {
            *self.available.entry(*recipient).or_insert(0) += amount;
        }
        self.custody -= total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_moves_funds_into_custody() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        vault.deposit(buyer, 1_000);

        vault.collect(&buyer, 400).unwrap();
        assert_eq!(vault.balance(&buyer), 600);
        assert_eq!(vault.custody(), 400);
    }

    #[test]
    fn collect_insufficient_funds() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        vault.deposit(buyer, 100);

        let err = vault.collect(&buyer, 200).unwrap_err();
        assert!(matches!(
            err,
            AgoraError::InsufficientFunds {
                needed: 200,
                available: 100
            }
        ));
        assert_eq!(vault.balance(&buyer), 100);
        assert_eq!(vault.custody(), 0);
    }

    #[test]
    fn payout_splits_custody() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        let seller = AgentId::new();
        let treasury = AgentId::new();
        vault.deposit(buyer, 100);
        vault.collect(&buyer, 100).unwrap();

        vault.payout(&[(treasury, 10), (seller, 90)]).unwrap();
        assert_eq!(vault.balance(&treasury), 10);
        assert_eq!(vault.balance(&seller), 90);
        assert_eq!(vault.custody(), 0);
    }

    #[test]
    fn payout_to_held_account_applies_nothing() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        let seller = AgentId::new();
        let treasury = AgentId::new();
        vault.deposit(buyer, 100);
        vault.collect(&buyer, 100).unwrap();
        vault.suspend(seller);

        let err = vault.payout(&[(treasury, 10), (seller, 90)]).unwrap_err();
        assert!(matches!(err, AgoraError::TransferRejected { .. }));

        // All-or-nothing: the treasury leg must not have applied either.
        assert_eq!(vault.balance(&treasury), 0);
        assert_eq!(vault.balance(&seller), 0);
        assert_eq!(vault.custody(), 100);
    }

    #[test]
    fn payout_beyond_custody_rejected() {
        let mut vault = VaultLedger::new();
        let seller = AgentId::new();
        let err = vault.payout(&[(seller, 1)]).unwrap_err();
        assert!(matches!(err, AgoraError::TransferRejected { .. }));
    }

    #[test]
    fn reinstate_lifts_hold() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        let seller = AgentId::new();
        vault.deposit(buyer, 50);
        vault.collect(&buyer, 50).unwrap();

        vault.suspend(seller);
        assert!(vault.is_held(&seller));
        vault.reinstate(&seller);
        assert!(!vault.is_held(&seller));

        vault.payout(&[(seller, 50)]).unwrap();
        assert_eq!(vault.balance(&seller), 50);
    }

    #[test]
    fn value_is_conserved_across_collect_and_payout() {
        let mut vault = VaultLedger::new();
        let buyer = AgentId::new();
        let seller = AgentId::new();
        vault.deposit(buyer, 777);

        vault.collect(&buyer, 300).unwrap();
        vault.payout(&[(seller, 300)]).unwrap();

        assert_eq!(
            vault.balance(&buyer) + vault.balance(&seller) + vault.custody(),
            777
        );
    }
}
