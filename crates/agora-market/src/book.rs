//! The listing store and its transition surface.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use agora_types::{
    AgentId, AgoraError, ArtifactKind, Listing, ListingId, ListingStatus, Result,
};

/// The pre-settlement view of a listing's mutable fields, captured before
/// settlement mutates them and restored if the payout is rejected.
#[derive(Debug, Clone, Copy)]
pub struct ListingSnapshot {
    pub status: ListingStatus,
    pub sold_at: Option<DateTime<Utc>>,
}

/// Owner of all listings, their identity sequence, and the enumeration
/// indexes.
///
/// Ids are allocated strictly increasing from 1 and never reused, even
/// across cancellations. The per-seller and per-buyer indexes are
/// append-only ordered sequences used purely for enumeration — never for
/// authorization decisions.
#[derive(Debug)]
pub struct ListingBook {
    listings: HashMap<ListingId, Listing>,
    next_id: u64,
    by_seller: HashMap<AgentId, Vec<ListingId>>,
    by_buyer: HashMap<AgentId, Vec<ListingId>>,
}

impl Default for ListingBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
            next_id: agora_types::constants::FIRST_LISTING_ID,
            by_seller: HashMap::new(),
            by_buyer: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------
    // Listing-manager operations
    // -----------------------------------------------------------------

    /// Create a new Active listing and return its id.
    ///
    /// # Errors
    /// - [`AgoraError::InvalidPrice`] if `price` is zero
    /// - [`AgoraError::EmptyMetadataRef`] if the artifact pointer is empty
    pub fn create(
        &mut self,
        seller: AgentId,
        price: u64,
        kind: ArtifactKind,
        metadata_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<ListingId> {
        if price == 0 {
            return Err(AgoraError::InvalidPrice);
        }
        if metadata_ref.is_empty() {
            return Err(AgoraError::EmptyMetadataRef);
        }

        let id = ListingId(self.next_id);
        self.next_id += 1;

        self.listings.insert(
            id,
            Listing {
                id,
                seller,
                price,
                kind,
                metadata_ref: metadata_ref.to_string(),
                status: ListingStatus::Active,
                buyer: None,
                created_at: now,
                sold_at: None,
            },
        );
        self.by_seller.entry(seller).or_default().push(id);
        Ok(id)
    }

    /// Cancel an Active listing.
    ///
    /// The in-trade guard (funds locked in escrow) lives with the caller:
    /// the marketplace facade refuses cancellation while an active escrow
    /// exists, before this method runs.
    ///
    /// # Errors
    /// - [`AgoraError::ListingNotFound`] for an unknown id
    /// - [`AgoraError::NotSeller`] if `caller` did not create the listing
    /// - [`AgoraError::ListingNotActive`] once the status left Active
    pub fn cancel(&mut self, caller: &AgentId, id: ListingId) -> Result<()> {
        let listing = self
            .listings
            .get_mut(&id)
            .ok_or(AgoraError::ListingNotFound(id))?;
        if listing.seller != *caller {
            return Err(AgoraError::NotSeller(id));
        }
        if listing.status != ListingStatus::Active {
            return Err(AgoraError::ListingNotActive {
                id,
                status: listing.status,
            });
        }
        listing.status = ListingStatus::Cancelled;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Transition surface for the settlement engine
    // -----------------------------------------------------------------

    /// Attach the buyer at purchase time.
    pub fn assign_buyer(&mut self, id: ListingId, buyer: AgentId) -> Result<()> {
        self.get_mut(id)?.buyer = Some(buyer);
        Ok(())
    }

    /// Move the status along the lifecycle chart.
    ///
    /// Rejects transitions the chart forbids; rollback goes through
    /// [`restore`](Self::restore) instead.
    pub fn transition(&mut self, id: ListingId, to: ListingStatus) -> Result<()> {
        let listing = self.get_mut(id)?;
        if !listing.status.can_transition_to(to) {
            return Err(AgoraError::Internal(format!(
                "forbidden status transition {} -> {to} on {id}",
                listing.status
            )));
        }
        listing.status = to;
        Ok(())
    }

    /// Stamp the sale timestamp at settlement.
    pub fn stamp_sold(&mut self, id: ListingId, at: DateTime<Utc>) -> Result<()> {
        self.get_mut(id)?.sold_at = Some(at);
        Ok(())
    }

    /// Append to the buyer's purchase index.
    pub fn record_purchase(&mut self, buyer: AgentId, id: ListingId) {
        self.by_buyer.entry(buyer).or_default().push(id);
    }

    /// Capture the fields settlement is about to mutate.
    pub fn snapshot(&self, id: ListingId) -> Result<ListingSnapshot> {
        let listing = self.get_ref(id)?;
        Ok(ListingSnapshot {
            status: listing.status,
            sold_at: listing.sold_at,
        })
    }

    /// Undo settlement's mutations after a rejected payout. Bypasses the
    /// transition chart on purpose.
    pub fn restore(&mut self, id: ListingId, snapshot: ListingSnapshot) -> Result<()> {
        let listing = self.get_mut(id)?;
        listing.status = snapshot.status;
        listing.sold_at = snapshot.sold_at;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Query layer
    // -----------------------------------------------------------------

    /// Look up a listing by id.
    #[must_use]
    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    /// Ordered ids of every listing the seller created.
    #[must_use]
    pub fn listings_by_seller(&self, seller: &AgentId) -> &[ListingId] {
        self.by_seller.get(seller).map_or(&[], Vec::as_slice)
    }

    /// Ordered ids of every listing the buyer purchased.
    #[must_use]
    pub fn purchases_by(&self, buyer: &AgentId) -> &[ListingId] {
        self.by_buyer.get(buyer).map_or(&[], Vec::as_slice)
    }

    /// Total listings ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    fn get_ref(&self, id: ListingId) -> Result<&Listing> {
        self.listings.get(&id).ok_or(AgoraError::ListingNotFound(id))
    }

    fn get_mut(&mut self, id: ListingId) -> Result<&mut Listing> {
        self.listings
            .get_mut(&id)
            .ok_or(AgoraError::ListingNotFound(id))
    }
}
