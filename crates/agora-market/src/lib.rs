//! # agora-market
//!
//! The listing book: creation and cancellation of sale offers, monotonic
//! id allocation, and the per-seller / per-buyer index sequences behind
//! the query layer.
//!
//! The book owns listing identity and every `Listing` record. The
//! settlement engine mutates listings only through the book's named
//! transition methods ([`ListingBook::assign_buyer`],
//! [`ListingBook::transition`], [`ListingBook::stamp_sold`],
//! [`ListingBook::record_purchase`]) plus the snapshot/restore pair that
//! backs settlement's rollback-on-transfer-failure guarantee.

pub mod book;

pub use book::{ListingBook, ListingSnapshot};
