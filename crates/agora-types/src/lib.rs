//! # agora-types
//!
//! Shared types, errors, and configuration for the **Agora** marketplace
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ListingId`], [`AgentId`]
//! - **Listing model**: [`Listing`], [`ListingStatus`], [`ArtifactKind`]
//! - **Escrow model**: [`Escrow`]
//! - **Fee model**: [`FeeSchedule`], [`FeeSplit`]
//! - **Event model**: [`MarketEvent`], [`EventRecord`]
//! - **Clock abstraction**: [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`AgoraError`] with `AGORA_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod escrow;
pub mod event;
pub mod fees;
pub mod ids;
pub mod listing;

// Re-export all primary types at crate root for ergonomic imports:
//   use agora_types::{Listing, ListingStatus, Escrow, MarketEvent, ...};

pub use clock::*;
pub use config::*;
pub use error::*;
pub use escrow::*;
pub use event::*;
pub use fees::*;
pub use ids::*;
pub use listing::*;

// Constants are accessed via `agora_types::constants::FOO`
// (not re-exported to avoid name collisions).
