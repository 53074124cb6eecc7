//! Identifiers used throughout Agora.
//!
//! `ListingId` is a monotonically increasing integer allocated by the
//! listing book — ids start at 1 and are never reused, even across
//! cancellations. `AgentId` uses UUIDv7 and is the opaque caller identity
//! every operation authenticates against; how that identity was verified
//! (signature, session token) is a collaborator concern.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier for a listing. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListingId(pub u64);

impl ListingId {
    /// The first id the listing book allocates.
    pub const FIRST: Self = Self(crate::constants::FIRST_LISTING_ID);

    /// The id that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listing:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AgentId
// ---------------------------------------------------------------------------

/// Opaque identity token for a marketplace participant.
///
/// Uses UUIDv7 for time-ordered sorting. The nil UUID plays the role of
/// the "null address" and is rejected wherever an address is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The nil identity. Never a valid participant or payout target.
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Short prefix for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
