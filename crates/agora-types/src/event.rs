//! The published event model — the sole boundary through which external
//! collaborators (search index, reputation ledger, webhook fan-out) learn
//! of state changes.
//!
//! Every successful mutating operation appends exactly one [`MarketEvent`]
//! to the facade's outbox, wrapped in an [`EventRecord`] carrying a
//! monotonic sequence number and a SHA-256 digest of the canonical JSON
//! payload. Collaborators drain the outbox; the core never calls out to
//! them synchronously.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AgentId, ArtifactKind, ListingId};

/// A structured state-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    AgentRegistered {
        agent: AgentId,
        name: String,
        /// The name this agent released to claim the new one, if any.
        released: Option<String>,
    },
    ListingCreated {
        listing_id: ListingId,
        seller: AgentId,
        price: u64,
        artifact: ArtifactKind,
    },
    ListingCancelled {
        listing_id: ListingId,
        seller: AgentId,
    },
    PurchaseInitiated {
        listing_id: ListingId,
        buyer: AgentId,
        seller: AgentId,
        amount: u64,
    },
    DeliveryMarked {
        listing_id: ListingId,
        seller: AgentId,
    },
    ReceiptConfirmed {
        listing_id: ListingId,
        buyer: AgentId,
    },
    PurchaseCompleted {
        listing_id: ListingId,
        buyer: AgentId,
        seller: AgentId,
        amount: u64,
        fee: u64,
    },
    DisputeRaised {
        listing_id: ListingId,
        raised_by: AgentId,
    },
    DisputeResolved {
        listing_id: ListingId,
        winner: AgentId,
        amount: u64,
    },
    FeeRateUpdated {
        rate_bps: u16,
    },
    FeeRecipientUpdated {
        recipient: AgentId,
    },
    OwnershipTransferred {
        previous: AgentId,
        new_owner: AgentId,
    },
}

impl MarketEvent {
    /// Stable operation-kind tag, matching the serde representation.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentRegistered { .. } => "agent_registered",
            Self::ListingCreated { .. } => "listing_created",
            Self::ListingCancelled { .. } => "listing_cancelled",
            Self::PurchaseInitiated { .. } => "purchase_initiated",
            Self::DeliveryMarked { .. } => "delivery_marked",
            Self::ReceiptConfirmed { .. } => "receipt_confirmed",
            Self::PurchaseCompleted { .. } => "purchase_completed",
            Self::DisputeRaised { .. } => "dispute_raised",
            Self::DisputeResolved { .. } => "dispute_resolved",
            Self::FeeRateUpdated { .. } => "fee_rate_updated",
            Self::FeeRecipientUpdated { .. } => "fee_recipient_updated",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }

    /// The listing this event concerns, for per-listing consumers.
    #[must_use]
    pub fn listing_id(&self) -> Option<ListingId> {
        match self {
            Self::ListingCreated { listing_id, .. }
            | Self::ListingCancelled { listing_id, .. }
            | Self::PurchaseInitiated { listing_id, .. }
            | Self::DeliveryMarked { listing_id, .. }
            | Self::ReceiptConfirmed { listing_id, .. }
            | Self::PurchaseCompleted { listing_id, .. }
            | Self::DisputeRaised { listing_id, .. }
            | Self::DisputeResolved { listing_id, .. } => Some(*listing_id),
            Self::AgentRegistered { .. }
            | Self::FeeRateUpdated { .. }
            | Self::FeeRecipientUpdated { .. }
            | Self::OwnershipTransferred { .. } => None,
        }
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// A published event plus its audit envelope.
///
/// Records form an append-only trail: sequence numbers are dense and the
/// digest lets downstream consumers verify the payload they indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Dense, monotonically increasing sequence number, starting at 0.
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 over the canonical JSON encoding of `event`.
    pub digest: [u8; 32],
    pub event: MarketEvent,
}

impl EventRecord {
    /// Wrap an event, computing its payload digest.
    #[must_use]
    pub fn seal(seq: u64, recorded_at: DateTime<Utc>, event: MarketEvent) -> Self {
        let digest = Self::digest_of(&event);
        Self {
            seq,
            recorded_at,
            digest,
            event,
        }
    }

    /// The canonical digest of an event payload.
    #[must_use]
    pub fn digest_of(event: &MarketEvent) -> [u8; 32] {
        let payload = serde_json::to_vec(event).expect("event serialization is infallible");
        let mut hasher = Sha256::new();
        hasher.update(b"agora:event:v1:");
        hasher.update(&payload);
        hasher.finalize().into()
    }

    /// Re-derive the digest and compare against the sealed one.
    #[must_use]
    pub fn verify(&self) -> bool {
        Self::digest_of(&self.event) == self.digest
    }

    /// Hex rendering of the digest for log lines and webhook signatures.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}
