//! Listing types for the Agora marketplace.
//!
//! A listing is a seller's offer to trade one digital artifact at a fixed
//! price. The artifact itself is never inspected — `metadata_ref` is an
//! opaque pointer (typically a content-addressed URI).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgentId, ListingId};

/// The category of artifact being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ArtifactKind {
    Skill,
    Prompt,
    Data,
    Content,
    Service,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skill => write!(f, "SKILL"),
            Self::Prompt => write!(f, "PROMPT"),
            Self::Data => write!(f, "DATA"),
            Self::Content => write!(f, "CONTENT"),
            Self::Service => write!(f, "SERVICE"),
        }
    }
}

/// Trading-lifecycle status of a listing.
///
/// `Sold` and `Cancelled` are terminal. `Disputed` is terminal for the
/// status field itself: arbitration pays the escrow out but leaves the
/// status as `Disputed`, so "is settled" must be read from the escrow's
/// locked amount, never from the status. A completed delivery handshake
/// still settles a disputed trade (`Disputed → Sold`); only auto-release
/// is blocked by an open dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Open for purchase, or in trade (escrow existence signals which).
    Active,
    /// Settlement completed and funds paid out.
    Sold,
    /// Withdrawn by the seller before any purchase.
    Cancelled,
    /// A participant raised a dispute; arbitration or the delivery
    /// handshake are the only exits.
    Disputed,
}

impl ListingStatus {
    /// Can this status transition to the given target?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Sold | Self::Cancelled | Self::Disputed)
                | (Self::Disputed, Self::Sold)
        )
    }

    /// Whether the trading lifecycle can still move funds from here.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Sold => write!(f, "SOLD"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Disputed => write!(f, "DISPUTED"),
        }
    }
}

/// A seller's offer to trade one artifact at a fixed price.
///
/// `seller`, `price`, `kind`, and `metadata_ref` are immutable after
/// creation. The settlement engine mutates the rest only through the
/// listing book's named transition methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller: AgentId,
    /// Price in the smallest currency unit. Strictly positive.
    pub price: u64,
    pub kind: ArtifactKind,
    /// Opaque artifact pointer (e.g. a content-addressed URI). Never
    /// parsed by the core.
    pub metadata_ref: String,
    pub status: ListingStatus,
    /// Unset until a purchase locks funds.
    pub buyer: Option<AgentId>,
    pub created_at: DateTime<Utc>,
    /// Stamped by settlement, not by purchase.
    pub sold_at: Option<DateTime<Utc>>,
}

impl Listing {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Whether `agent` is the buyer or the seller of this listing.
    #[must_use]
    pub fn is_participant(&self, agent: &AgentId) -> bool {
        self.seller == *agent || self.buyer.as_ref() == Some(agent)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Listing {
    pub fn dummy(seller: AgentId, price: u64) -> Self {
        Self {
            id: ListingId::FIRST,
            seller,
            price,
            kind: ArtifactKind::Data,
            metadata_ref: "ipfs://bafytestartifact".to_string(),
            status: ListingStatus::Active,
            buyer: None,
            created_at: Utc::now(),
            sold_at: None,
        }
    }
}
