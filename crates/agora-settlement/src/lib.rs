//! # agora-settlement
//!
//! Fund custody and the escrow state machine: purchase, the
//! delivery/confirmation handshake, fee computation and payout, dispute
//! arbitration, and timeout auto-release.
//!
//! ## Architecture
//!
//! - [`Ledger`]: the transfer boundary. `collect` pulls a buyer's payment
//!   into custody at purchase; `payout` releases custody all-or-nothing at
//!   settlement or arbitration. [`VaultLedger`] is the in-memory
//!   implementation.
//! - [`EscrowEngine`]: the only writer of escrow records and the single
//!   source of truth for "has this trade been paid out".
//! - [`OwnerGate`]: the administrative capability check (fee
//!   configuration, dispute arbitration, ownership transfer).
//! - [`Marketplace`]: the single-writer facade owning every piece of
//!   state. All mutation is serialized through `&mut self`; collaborators
//!   learn of changes only by draining the event outbox.
//!
//! ## Ordering discipline
//!
//! Bookkeeping always mutates *before* funds move, and a rejected payout
//! rolls the bookkeeping back in the same operation. No state in which
//! funds moved but the books disagree is ever observable.

pub mod access;
pub mod engine;
pub mod ledger;
pub mod marketplace;

pub use access::OwnerGate;
pub use engine::{ArbitrationReceipt, EscrowEngine, SettlementReceipt};
pub use ledger::{Ledger, VaultLedger};
pub use marketplace::Marketplace;
