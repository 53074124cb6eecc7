//! The escrow state machine and settlement paths.
//!
//! ## Paths out of an escrow
//!
//! ```text
//!                 ┌── both flags set ──────────────▶ settle (fee split)
//!   purchase ─────┤── grace elapsed + delivered ───▶ auto-release → settle
//!                 └── dispute ──▶ arbitration ─────▶ full payout, no fee
//! ```
//!
//! Every path zeroes the locked amount *before* funds move and rolls the
//! bookkeeping back if the payout is rejected. The zeroed amount is the
//! idempotency sentinel: once a trade paid out, every further settlement
//! or arbitration attempt fails on the inactive escrow.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use agora_market::ListingBook;
use agora_types::{
    AgentId, AgoraError, Escrow, FeeSchedule, ListingId, ListingStatus, Result,
    constants::AUTO_RELEASE_GRACE_SECS,
};

use crate::ledger::Ledger;

/// What a completed settlement paid, and to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub listing_id: ListingId,
    pub buyer: AgentId,
    pub seller: AgentId,
    /// The full locked amount: `fee + (amount - fee)` by construction.
    pub amount: u64,
    pub fee: u64,
}

/// What arbitration paid out. The full amount, never a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationReceipt {
    pub listing_id: ListingId,
    pub winner: AgentId,
    pub amount: u64,
}

/// Custodian of every escrow record and the only writer of them.
#[derive(Debug)]
pub struct EscrowEngine {
    /// Escrows keyed by listing id. Never removed, only zeroed.
    escrows: HashMap<ListingId, Escrow>,
    /// How long after lock time auto-release stays unavailable.
    grace: Duration,
}

impl EscrowEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_grace_secs(AUTO_RELEASE_GRACE_SECS)
    }

    #[must_use]
    pub fn with_grace_secs(grace_secs: i64) -> Self {
        Self {
            escrows: HashMap::new(),
            grace: Duration::seconds(grace_secs),
        }
    }

    /// Look up an escrow record (active or settled).
    #[must_use]
    pub fn escrow(&self, id: ListingId) -> Option<&Escrow> {
        self.escrows.get(&id)
    }

    /// Whether funds are currently locked for this listing.
    #[must_use]
    pub fn is_locked(&self, id: ListingId) -> bool {
        self.escrows.get(&id).is_some_and(Escrow::is_active)
    }

    /// Number of escrows still holding funds.
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.escrows.values().filter(|e| e.is_active()).count()
    }

    /// Lock a buyer's payment against an Active listing.
    ///
    /// Collects exactly the listing price into custody, creates the
    /// escrow with both flags down, assigns the buyer, and appends to the
    /// buyer's purchase index. The listing status stays `Active` — escrow
    /// existence is what signals "in trade".
    pub fn purchase<L: Ledger>(
        &mut self,
        book: &mut ListingBook,
        ledger: &mut L,
        buyer: AgentId,
        id: ListingId,
        payment: u64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        let seller = listing.seller;
        let price = listing.price;
        let status = listing.status;

        if status != ListingStatus::Active {
            return Err(AgoraError::ListingNotActive { id, status });
        }
        if self.is_locked(id) {
            return Err(AgoraError::ListingInEscrow(id));
        }
        if buyer == seller {
            return Err(AgoraError::SelfPurchase);
        }
        if payment != price {
            return Err(AgoraError::PaymentMismatch {
                expected: price,
                offered: payment,
            });
        }

        ledger.collect(&buyer, payment)?;
        self.escrows.insert(id, Escrow::lock(id, payment, now));
        book.assign_buyer(id, buyer)?;
        book.record_purchase(buyer, id);
        Ok(())
    }

    /// Seller-side half of the handshake. Settles immediately when the
    /// buyer already confirmed.
    pub fn mark_delivered<L: Ledger>(
        &mut self,
        book: &mut ListingBook,
        ledger: &mut L,
        fees: &FeeSchedule,
        caller: &AgentId,
        id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<Option<SettlementReceipt>> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        if listing.seller != *caller {
            return Err(AgoraError::NotSeller(id));
        }

        let escrow = self
            .escrows
            .get_mut(&id)
            .filter(|e| e.is_active())
            .ok_or(AgoraError::EscrowInactive(id))?;
        if escrow.seller_delivered {
            return Err(AgoraError::AlreadyDelivered(id));
        }

        escrow.seller_delivered = true;
        if !escrow.handshake_complete() {
            return Ok(None);
        }
        match Self::settle(book, ledger, fees, escrow, now) {
            Ok(receipt) => Ok(Some(receipt)),
            Err(err) => {
                // Abort atomically: the flag set by this call rolls back too.
                escrow.seller_delivered = false;
                Err(err)
            }
        }
    }

    /// Buyer-side half of the handshake. Settles immediately when the
    /// seller already delivered.
    pub fn confirm_receipt<L: Ledger>(
        &mut self,
        book: &mut ListingBook,
        ledger: &mut L,
        fees: &FeeSchedule,
        caller: &AgentId,
        id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<Option<SettlementReceipt>> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        if listing.buyer.as_ref() != Some(caller) {
            return Err(AgoraError::NotBuyer(id));
        }

        let escrow = self
            .escrows
            .get_mut(&id)
            .filter(|e| e.is_active())
            .ok_or(AgoraError::EscrowInactive(id))?;
        if escrow.buyer_confirmed {
            return Err(AgoraError::AlreadyConfirmed(id));
        }

        escrow.buyer_confirmed = true;
        if !escrow.handshake_complete() {
            return Ok(None);
        }
        match Self::settle(book, ledger, fees, escrow, now) {
            Ok(receipt) => Ok(Some(receipt)),
            Err(err) => {
                escrow.buyer_confirmed = false;
                Err(err)
            }
        }
    }

    /// Open a dispute. No funds move; the listing is parked in
    /// `Disputed` until arbitration (or a completed handshake) ends it.
    pub fn raise_dispute(
        &mut self,
        book: &mut ListingBook,
        caller: &AgentId,
        id: ListingId,
    ) -> Result<()> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        if !listing.is_participant(caller) {
            return Err(AgoraError::NotParticipant(id));
        }
        if !self.is_locked(id) {
            return Err(AgoraError::EscrowInactive(id));
        }
        if listing.status == ListingStatus::Disputed {
            return Err(AgoraError::AlreadyDisputed(id));
        }
        book.transition(id, ListingStatus::Disputed)
    }

    /// Arbitrate a disputed trade: the full locked amount goes to the
    /// declared winner, fee-free. The caller is responsible for the
    /// owner gate.
    ///
    /// The listing status stays `Disputed` afterwards — arbitration
    /// clears the lock, not the status. "Is settled" is read from the
    /// escrow's zeroed amount, which also makes a second resolution
    /// attempt fail.
    pub fn resolve_dispute<L: Ledger>(
        &mut self,
        book: &mut ListingBook,
        ledger: &mut L,
        id: ListingId,
        winner: AgentId,
    ) -> Result<ArbitrationReceipt> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        if listing.status != ListingStatus::Disputed {
            return Err(AgoraError::NotDisputed {
                id,
                status: listing.status,
            });
        }
        if winner != listing.seller && listing.buyer != Some(winner) {
            return Err(AgoraError::InvalidWinner);
        }

        let escrow = self
            .escrows
            .get_mut(&id)
            .filter(|e| e.is_active())
            .ok_or(AgoraError::EscrowInactive(id))?;

        let amount = escrow.amount;
        escrow.amount = 0;
        if let Err(err) = ledger.payout(&[(winner, amount)]) {
            escrow.amount = amount;
            return Err(err);
        }

        Ok(ArbitrationReceipt {
            listing_id: id,
            winner,
            amount,
        })
    }

    /// Dead-man's-switch settlement, callable by anyone once the grace
    /// period has elapsed. Forces the buyer confirmation and settles
    /// exactly as the buyer-initiated path would.
    pub fn auto_release<L: Ledger>(
        &mut self,
        book: &mut ListingBook,
        ledger: &mut L,
        fees: &FeeSchedule,
        id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<SettlementReceipt> {
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        let status = listing.status;
        let grace = self.grace;

        let escrow = self
            .escrows
            .get_mut(&id)
            .filter(|e| e.is_active())
            .ok_or(AgoraError::EscrowInactive(id))?;
        if !escrow.seller_delivered {
            return Err(AgoraError::DeliveryPending(id));
        }
        if status == ListingStatus::Disputed {
            return Err(AgoraError::AlreadyDisputed(id));
        }
        let elapsed = now - escrow.locked_at;
        if elapsed < grace {
            return Err(AgoraError::GracePeriodActive {
                id,
                remaining_secs: (grace - elapsed).num_seconds(),
            });
        }

        let was_confirmed = escrow.buyer_confirmed;
        escrow.buyer_confirmed = true;
        match Self::settle(book, ledger, fees, escrow, now) {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                escrow.buyer_confirmed = was_confirmed;
                Err(err)
            }
        }
    }

    /// The one settlement routine behind every happy path.
    ///
    /// Bookkeeping mutates first — lock zeroed, listing terminated,
    /// sale stamped — then a single all-or-nothing payout releases
    /// custody. A rejected payout restores every mutation and surfaces
    /// the transfer error unchanged.
    fn settle<L: Ledger>(
        book: &mut ListingBook,
        ledger: &mut L,
        fees: &FeeSchedule,
        escrow: &mut Escrow,
        now: DateTime<Utc>,
    ) -> Result<SettlementReceipt> {
        let id = escrow.listing_id;
        let listing = book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        let seller = listing.seller;
        let buyer = listing
            .buyer
            .ok_or_else(|| AgoraError::Internal(format!("escrowed {id} has no buyer")))?;

        let amount = escrow.amount;
        let split = fees.split(amount);

        let snapshot = book.snapshot(id)?;
        escrow.amount = 0;
        book.transition(id, ListingStatus::Sold)?;
        book.stamp_sold(id, now)?;

        let mut transfers = Vec::with_capacity(2);
        if split.fee > 0 {
            transfers.push((fees.recipient, split.fee));
        }
        transfers.push((seller, split.seller_amount));

        if let Err(err) = ledger.payout(&transfers) {
            tracing::warn!(listing = %id, error = %err, "payout rejected, rolling settlement back");
            escrow.amount = amount;
            book.restore(id, snapshot)?;
            return Err(err);
        }

        Ok(SettlementReceipt {
            listing_id: id,
            buyer,
            seller,
            amount,
            fee: split.fee,
        })
    }
}

impl Default for EscrowEngine {
    fn default() -> Self {
        Self::new()
    }
}
