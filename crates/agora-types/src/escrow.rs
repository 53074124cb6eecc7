//! Escrow record: the locked-fund state tied to a listing's purchase.
//!
//! ## Lifecycle
//!
//! ```text
//!   purchase            both flags set,          settlement /
//!   locks funds         or auto-release          arbitration
//!   ───────────▶ ACTIVE ───────────────▶ settle ───────────▶ amount = 0
//! ```
//!
//! The locked amount doubles as the activity sentinel: an escrow with
//! `amount == 0` is settled/inactive regardless of the flags, and every
//! settlement path checks it first. This is what makes settlement
//! idempotent and blocks double-dispute — the record itself is never
//! deleted, only zeroed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ListingId;

/// Locked funds for a purchased listing, keyed 1:1 by listing id.
///
/// The settlement engine is the only writer and the single source of
/// truth for "has this trade been paid out".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escrow {
    pub listing_id: ListingId,
    /// Locked amount in the smallest currency unit. Zero means settled.
    pub amount: u64,
    /// Set by the buyer's `confirm_receipt` (or forced by auto-release).
    pub buyer_confirmed: bool,
    /// Set by the seller's `mark_delivered`.
    pub seller_delivered: bool,
    /// When the purchase locked the funds. Anchor for the grace period.
    pub locked_at: DateTime<Utc>,
}

impl Escrow {
    /// A fresh escrow holding `amount`, both flags down.
    #[must_use]
    pub fn lock(listing_id: ListingId, amount: u64, locked_at: DateTime<Utc>) -> Self {
        Self {
            listing_id,
            amount,
            buyer_confirmed: false,
            seller_delivered: false,
            locked_at,
        }
    }

    /// Whether funds are still locked. Zero amount means the trade has
    /// been paid out (settlement or arbitration).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.amount > 0
    }

    /// Both sides of the handshake are done; settlement fires.
    #[must_use]
    pub fn handshake_complete(&self) -> bool {
        self.buyer_confirmed && self.seller_delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_escrow_is_active() {
        let escrow = Escrow::lock(ListingId(1), 100, Utc::now());
        assert!(escrow.is_active());
        assert!(!escrow.buyer_confirmed);
        assert!(!escrow.seller_delivered);
        assert!(!escrow.handshake_complete());
    }

    #[test]
    fn zero_amount_is_inactive_regardless_of_flags() {
        let mut escrow = Escrow::lock(ListingId(1), 100, Utc::now());
        escrow.buyer_confirmed = true;
        escrow.seller_delivered = true;
        escrow.amount = 0;
        assert!(!escrow.is_active());
        assert!(escrow.handshake_complete());
    }

    #[test]
    fn handshake_requires_both_flags() {
        let mut escrow = Escrow::lock(ListingId(1), 100, Utc::now());
        escrow.seller_delivered = true;
        assert!(!escrow.handshake_complete());
        escrow.buyer_confirmed = true;
        assert!(escrow.handshake_complete());
    }

    #[test]
    fn serde_roundtrip() {
        let escrow = Escrow::lock(ListingId(9), 5_000, Utc::now());
        let json = serde_json::to_string(&escrow).unwrap();
        let back: Escrow = serde_json::from_str(&json).unwrap();
        assert_eq!(escrow.listing_id, back.listing_id);
        assert_eq!(escrow.amount, back.amount);
        assert_eq!(escrow.locked_at, back.locked_at);
    }
}
