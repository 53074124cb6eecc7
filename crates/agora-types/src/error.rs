//! Error types for the Agora marketplace engine.
//!
//! All errors use the `AGORA_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by taxonomy class:
//! - 1xx: Validation errors (malformed or out-of-range input)
//! - 2xx: Authorization errors (caller lacks the required relationship)
//! - 3xx: State errors (operation invalid for the current lifecycle stage)
//! - 4xx: Conflict errors (uniqueness violations)
//! - 5xx: Transfer errors (fund movement failed — fatal, never retried)
//! - 9xx: General / internal errors
//!
//! Transfer errors abort the triggering operation atomically: the engine
//! rolls every bookkeeping mutation back before surfacing them.

use thiserror::Error;

use crate::{ListingId, ListingStatus};

/// The five taxonomy classes callers can branch on without matching
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Conflict,
    Transfer,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::State => write!(f, "STATE"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all Agora operations.
#[derive(Debug, Error)]
pub enum AgoraError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// Agent names must be non-empty.
    #[error("AGORA_ERR_100: Agent name must not be empty")]
    EmptyAgentName,

    /// The listing metadata reference must be non-empty.
    #[error("AGORA_ERR_101: Metadata reference must not be empty")]
    EmptyMetadataRef,

    /// Listing prices must be strictly positive.
    #[error("AGORA_ERR_102: Listing price must be positive")]
    InvalidPrice,

    /// The offered payment does not exactly match the listing price.
    #[error("AGORA_ERR_103: Payment mismatch: listing price is {expected}, offered {offered}")]
    PaymentMismatch { expected: u64, offered: u64 },

    /// A seller attempted to buy their own listing.
    #[error("AGORA_ERR_104: Self-purchase blocked: buyer and seller are the same agent")]
    SelfPurchase,

    /// The requested fee rate exceeds the hard cap.
    #[error("AGORA_ERR_105: Fee rate {bps} bps exceeds the cap of {cap} bps")]
    FeeAboveCap { bps: u16, cap: u16 },

    /// The nil address is never a valid configuration target.
    #[error("AGORA_ERR_106: The nil address is not a valid recipient")]
    NilAddress,

    /// Dispute winner must be the buyer or the seller of the listing.
    #[error("AGORA_ERR_107: Dispute winner must be the buyer or the seller")]
    InvalidWinner,

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The caller is not the seller of the listing.
    #[error("AGORA_ERR_200: Caller is not the seller of {0}")]
    NotSeller(ListingId),

    /// The caller is not the buyer of the listing.
    #[error("AGORA_ERR_201: Caller is not the buyer of {0}")]
    NotBuyer(ListingId),

    /// The caller is not the marketplace owner.
    #[error("AGORA_ERR_202: Caller is not the marketplace owner")]
    NotOwner,

    /// The caller is neither the buyer nor the seller of the listing.
    #[error("AGORA_ERR_203: Caller is not a participant of {0}")]
    NotParticipant(ListingId),

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// The requested listing does not exist.
    #[error("AGORA_ERR_300: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The operation requires an Active listing.
    #[error("AGORA_ERR_301: Listing {id} is {status}, not ACTIVE")]
    ListingNotActive { id: ListingId, status: ListingStatus },

    /// The listing has locked funds in flight; the operation is blocked
    /// until the trade terminates.
    #[error("AGORA_ERR_302: Listing {0} has an active escrow")]
    ListingInEscrow(ListingId),

    /// No active escrow exists for the listing (never purchased, or the
    /// locked amount was already cleared by settlement or arbitration).
    #[error("AGORA_ERR_303: No active escrow for {0}")]
    EscrowInactive(ListingId),

    /// The seller already marked this trade delivered.
    #[error("AGORA_ERR_304: Delivery already marked for {0}")]
    AlreadyDelivered(ListingId),

    /// The buyer already confirmed receipt for this trade.
    #[error("AGORA_ERR_305: Receipt already confirmed for {0}")]
    AlreadyConfirmed(ListingId),

    /// A dispute is already open for this listing.
    #[error("AGORA_ERR_306: Listing {0} is already disputed")]
    AlreadyDisputed(ListingId),

    /// Dispute resolution requires a Disputed listing.
    #[error("AGORA_ERR_307: Listing {id} is {status}, not DISPUTED")]
    NotDisputed { id: ListingId, status: ListingStatus },

    /// Auto-release requires the seller to have marked delivery first.
    #[error("AGORA_ERR_308: Delivery not yet marked for {0}")]
    DeliveryPending(ListingId),

    /// The auto-release grace period has not elapsed yet.
    #[error("AGORA_ERR_309: Grace period still active for {id}: {remaining_secs}s remaining")]
    GracePeriodActive { id: ListingId, remaining_secs: i64 },

    // =================================================================
    // Conflict Errors (4xx)
    // =================================================================
    /// The name is already bound to a different agent.
    #[error("AGORA_ERR_400: Name already taken: {name}")]
    NameTaken { name: String },

    // =================================================================
    // Transfer Errors (5xx)
    // =================================================================
    /// The transfer boundary rejected a fund movement. Fatal to the
    /// triggering operation; prior state is left unchanged.
    #[error("AGORA_ERR_500: Transfer rejected: {reason}")]
    TransferRejected { reason: String },

    /// The payer cannot cover the amount being collected into custody.
    #[error("AGORA_ERR_501: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("AGORA_ERR_900: Internal error: {0}")]
    Internal(String),
}

impl AgoraError {
    /// The taxonomy class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyAgentName
            | Self::EmptyMetadataRef
            | Self::InvalidPrice
            | Self::PaymentMismatch { .. }
            | Self::SelfPurchase
            | Self::FeeAboveCap { .. }
            | Self::NilAddress
            | Self::InvalidWinner => ErrorKind::Validation,

            Self::NotSeller(_) | Self::NotBuyer(_) | Self::NotOwner | Self::NotParticipant(_) => {
                ErrorKind::Authorization
            }

            Self::ListingNotFound(_)
            | Self::ListingNotActive { .. }
            | Self::ListingInEscrow(_)
            | Self::EscrowInactive(_)
            | Self::AlreadyDelivered(_)
            | Self::AlreadyConfirmed(_)
            | Self::AlreadyDisputed(_)
            | Self::NotDisputed { .. }
            | Self::DeliveryPending(_)
            | Self::GracePeriodActive { .. } => ErrorKind::State,

            Self::NameTaken { .. } => ErrorKind::Conflict,

            Self::TransferRejected { .. } | Self::InsufficientFunds { .. } => ErrorKind::Transfer,

            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AgoraError>;
