//! The single-writer marketplace facade.
//!
//! Owns the registry, the listing book, the escrow engine, the owner
//! gate, the fee schedule, the ledger, and the event outbox. Every
//! mutating operation goes through `&mut self`, which is the serialization
//! point: no two mutations interleave, and a reader never observes a
//! partially applied transition. Wrap the value in whatever single-writer
//! context the host application uses (a mutex, an actor task); the facade
//! itself never spawns or blocks.
//!
//! External collaborators (search index, webhook fan-out) learn of state
//! changes exclusively by draining the event outbox — the facade never
//! calls out synchronously.

use std::collections::VecDeque;

use agora_market::ListingBook;
use agora_registry::{AgentRegistry, RegistrationOutcome};
use agora_types::{
    AgentId, AgoraError, ArtifactKind, Clock, EngineConfig, Escrow, EventRecord, FeeSchedule,
    Listing, ListingId, MarketEvent, Result, constants::FEE_CAP_BPS,
};

use crate::access::OwnerGate;
use crate::engine::EscrowEngine;
use crate::ledger::Ledger;

/// The marketplace: listings, escrow, registry, fees, and events behind
/// one mutable handle.
#[derive(Debug)]
pub struct Marketplace<L, C> {
    registry: AgentRegistry,
    book: ListingBook,
    engine: EscrowEngine,
    gate: OwnerGate,
    fees: FeeSchedule,
    events: VecDeque<EventRecord>,
    next_seq: u64,
    ledger: L,
    clock: C,
}

impl<L: Ledger, C: Clock> Marketplace<L, C> {
    /// Build a marketplace with the default configuration.
    pub fn new(owner: AgentId, fee_recipient: AgentId, ledger: L, clock: C) -> Result<Self> {
        Self::with_config(owner, fee_recipient, EngineConfig::default(), ledger, clock)
    }

    pub fn with_config(
        owner: AgentId,
        fee_recipient: AgentId,
        config: EngineConfig,
        ledger: L,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: AgentRegistry::new(),
            book: ListingBook::new(),
            engine: EscrowEngine::with_grace_secs(config.grace_period_secs),
            gate: OwnerGate::new(owner)?,
            fees: FeeSchedule::new(config.fee_rate_bps, fee_recipient)?,
            events: VecDeque::new(),
            next_seq: 0,
            ledger,
            clock,
        })
    }

    // -----------------------------------------------------------------
    // Agent registry
    // -----------------------------------------------------------------

    /// Bind a name to the caller, releasing any name they held before.
    pub fn register_agent(&mut self, caller: AgentId, name: &str) -> Result<()> {
        match self.registry.register(caller, name)? {
            RegistrationOutcome::Unchanged => Ok(()),
            RegistrationOutcome::Registered { released } => {
                tracing::info!(agent = %caller.short(), name, "agent registered");
                self.emit(MarketEvent::AgentRegistered {
                    agent: caller,
                    name: name.to_string(),
                    released,
                });
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------
    // Listing manager
    // -----------------------------------------------------------------

    /// Create a sale offer. Returns the newly allocated id.
    pub fn create_listing(
        &mut self,
        caller: AgentId,
        price: u64,
        kind: ArtifactKind,
        metadata_ref: &str,
    ) -> Result<ListingId> {
        let now = self.clock.now();
        let id = self.book.create(caller, price, kind, metadata_ref, now)?;
        tracing::info!(listing = %id, seller = %caller.short(), price, artifact = %kind, "listing created");
        self.emit(MarketEvent::ListingCreated {
            listing_id: id,
            seller: caller,
            price,
            artifact: kind,
        });
        Ok(id)
    }

    /// Withdraw an Active listing. Refused while funds are locked — a
    /// purchase has no cancellation path, only dispute or auto-release.
    pub fn cancel_listing(&mut self, caller: AgentId, id: ListingId) -> Result<()> {
        let listing = self.book.get(id).ok_or(AgoraError::ListingNotFound(id))?;
        if listing.seller != caller {
            return Err(AgoraError::NotSeller(id));
        }
        if self.engine.is_locked(id) {
            return Err(AgoraError::ListingInEscrow(id));
        }
        self.book.cancel(&caller, id)?;
        tracing::info!(listing = %id, "listing cancelled");
        self.emit(MarketEvent::ListingCancelled {
            listing_id: id,
            seller: caller,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Escrow & settlement
    // -----------------------------------------------------------------

    /// Buy a listing at exactly its price, locking the payment in escrow.
    pub fn purchase(&mut self, caller: AgentId, id: ListingId, payment: u64) -> Result<()> {
        let now = self.clock.now();
        self.engine
            .purchase(&mut self.book, &mut self.ledger, caller, id, payment, now)?;
        let seller = self
            .book
            .get(id)
            .map(|l| l.seller)
            .ok_or(AgoraError::ListingNotFound(id))?;
        tracing::info!(listing = %id, buyer = %caller.short(), amount = payment, "purchase initiated");
        self.emit(MarketEvent::PurchaseInitiated {
            listing_id: id,
            buyer: caller,
            seller,
            amount: payment,
        });
        Ok(())
    }

    /// Seller marks the artifact delivered. Settles when the buyer has
    /// already confirmed.
    pub fn mark_delivered(&mut self, caller: AgentId, id: ListingId) -> Result<()> {
        let now = self.clock.now();
        let settled = self.engine.mark_delivered(
            &mut self.book,
            &mut self.ledger,
            &self.fees,
            &caller,
            id,
            now,
        )?;
        self.emit(MarketEvent::DeliveryMarked {
            listing_id: id,
            seller: caller,
        });
        if let Some(receipt) = settled {
            self.emit_settlement(&receipt);
        }
        Ok(())
    }

    /// Buyer confirms receipt. Settles when the seller has already
    /// delivered.
    pub fn confirm_receipt(&mut self, caller: AgentId, id: ListingId) -> Result<()> {
        let now = self.clock.now();
        let settled = self.engine.confirm_receipt(
            &mut self.book,
            &mut self.ledger,
            &self.fees,
            &caller,
            id,
            now,
        )?;
        self.emit(MarketEvent::ReceiptConfirmed {
            listing_id: id,
            buyer: caller,
        });
        if let Some(receipt) = settled {
            self.emit_settlement(&receipt);
        }
        Ok(())
    }

    /// Either participant opens a dispute; funds stay locked.
    pub fn raise_dispute(&mut self, caller: AgentId, id: ListingId) -> Result<()> {
        self.engine.raise_dispute(&mut self.book, &caller, id)?;
        tracing::info!(listing = %id, by = %caller.short(), "dispute raised");
        self.emit(MarketEvent::DisputeRaised {
            listing_id: id,
            raised_by: caller,
        });
        Ok(())
    }

    /// Owner-only arbitration: pay the full locked amount to `winner`.
    pub fn resolve_dispute(
        &mut self,
        caller: AgentId,
        id: ListingId,
        winner: AgentId,
    ) -> Result<()> {
        self.gate.require(&caller)?;
        let receipt = self
            .engine
            .resolve_dispute(&mut self.book, &mut self.ledger, id, winner)?;
        tracing::info!(listing = %id, winner = %winner.short(), amount = receipt.amount, "dispute resolved");
        self.emit(MarketEvent::DisputeResolved {
            listing_id: id,
            winner,
            amount: receipt.amount,
        });
        Ok(())
    }

    /// Permissionless timeout settlement once the grace period elapsed.
    pub fn auto_release(&mut self, id: ListingId) -> Result<()> {
        let now = self.clock.now();
        let receipt =
            self.engine
                .auto_release(&mut self.book, &mut self.ledger, &self.fees, id, now)?;
        tracing::info!(listing = %id, amount = receipt.amount, "auto-release settled");
        self.emit_settlement(&receipt);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Owner-only. Applies to every future settlement, including escrows
    /// already locked under the previous rate.
    pub fn set_fee_rate(&mut self, caller: AgentId, rate_bps: u16) -> Result<()> {
        self.gate.require(&caller)?;
        if rate_bps > FEE_CAP_BPS {
            return Err(AgoraError::FeeAboveCap {
                bps: rate_bps,
                cap: FEE_CAP_BPS,
            });
        }
        self.fees.rate_bps = rate_bps;
        tracing::info!(rate_bps, "fee rate updated");
        self.emit(MarketEvent::FeeRateUpdated { rate_bps });
        Ok(())
    }

    /// Owner-only.
    pub fn set_fee_recipient(&mut self, caller: AgentId, recipient: AgentId) -> Result<()> {
        self.gate.require(&caller)?;
        if recipient.is_nil() {
            return Err(AgoraError::NilAddress);
        }
        self.fees.recipient = recipient;
        self.emit(MarketEvent::FeeRecipientUpdated { recipient });
        Ok(())
    }

    /// Owner-only.
    pub fn transfer_ownership(&mut self, caller: AgentId, new_owner: AgentId) -> Result<()> {
        let previous = self.gate.transfer(&caller, new_owner)?;
        tracing::info!(new_owner = %new_owner.short(), "ownership transferred");
        self.emit(MarketEvent::OwnershipTransferred {
            previous,
            new_owner,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Query layer (pure reads, no authorization)
    // -----------------------------------------------------------------

    #[must_use]
    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.book.get(id)
    }

    #[must_use]
    pub fn escrow(&self, id: ListingId) -> Option<&Escrow> {
        self.engine.escrow(id)
    }

    #[must_use]
    pub fn listings_by_seller(&self, seller: &AgentId) -> &[ListingId] {
        self.book.listings_by_seller(seller)
    }

    #[must_use]
    pub fn purchases_by(&self, buyer: &AgentId) -> &[ListingId] {
        self.book.purchases_by(buyer)
    }

    #[must_use]
    pub fn fee_rate(&self) -> u16 {
        self.fees.rate_bps
    }

    #[must_use]
    pub fn fee_recipient(&self) -> AgentId {
        self.fees.recipient
    }

    #[must_use]
    pub fn owner(&self) -> AgentId {
        self.gate.owner()
    }

    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<AgentId> {
        self.registry.resolve(name)
    }

    #[must_use]
    pub fn agent_name(&self, agent: &AgentId) -> Option<&str> {
        self.registry.name_of(agent)
    }

    /// The transfer boundary, for funding and balance inspection.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // -----------------------------------------------------------------
    // Event outbox
    // -----------------------------------------------------------------

    /// Take every pending event, in publication order.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain(..).collect()
    }

    /// Peek at pending events without consuming them.
    pub fn pending_events(&self) -> impl Iterator<Item = &EventRecord> {
        self.events.iter()
    }

    fn emit_settlement(&mut self, receipt: &crate::engine::SettlementReceipt) {
        tracing::info!(
            listing = %receipt.listing_id,
            amount = receipt.amount,
            fee = receipt.fee,
            "purchase completed"
        );
        self.emit(MarketEvent::PurchaseCompleted {
            listing_id: receipt.listing_id,
            buyer: receipt.buyer,
            seller: receipt.seller,
            amount: receipt.amount,
            fee: receipt.fee,
        });
    }

    fn emit(&mut self, event: MarketEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events
            .push_back(EventRecord::seal(seq, self.clock.now(), event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::VaultLedger;
    use agora_types::SystemClock;

    fn marketplace() -> Marketplace<VaultLedger, SystemClock> {
        Marketplace::new(AgentId::new(), AgentId::new(), VaultLedger::new(), SystemClock)
            .unwrap()
    }

    #[test]
    fn construction_rejects_nil_owner() {
        let err = Marketplace::new(
            AgentId::nil(),
            AgentId::new(),
            VaultLedger::new(),
            SystemClock,
        )
        .unwrap_err();
        assert!(matches!(err, AgoraError::NilAddress));
    }

    #[test]
    fn construction_rejects_bad_config() {
        let config = EngineConfig {
            fee_rate_bps: 5_000,
            ..EngineConfig::default()
        };
        let err = Marketplace::with_config(
            AgentId::new(),
            AgentId::new(),
            config,
            VaultLedger::new(),
            SystemClock,
        )
        .unwrap_err();
        assert!(matches!(err, AgoraError::FeeAboveCap { .. }));
    }

    #[test]
    fn admin_operations_are_owner_gated() {
        let mut market = marketplace();
        let stranger = AgentId::new();

        assert!(matches!(
            market.set_fee_rate(stranger, 100).unwrap_err(),
            AgoraError::NotOwner
        ));
        assert!(matches!(
            market.set_fee_recipient(stranger, AgentId::new()).unwrap_err(),
            AgoraError::NotOwner
        ));
        assert!(matches!(
            market
                .resolve_dispute(stranger, ListingId(1), AgentId::new())
                .unwrap_err(),
            AgoraError::NotOwner
        ));
        assert!(matches!(
            market
                .transfer_ownership(stranger, AgentId::new())
                .unwrap_err(),
            AgoraError::NotOwner
        ));
    }

    #[test]
    fn fee_rate_cap_enforced_via_facade() {
        let mut market = marketplace();
        let owner = market.owner();
        let err = market.set_fee_rate(owner, 1_001).unwrap_err();
        assert!(matches!(err, AgoraError::FeeAboveCap { .. }));
        market.set_fee_rate(owner, 1_000).unwrap();
        assert_eq!(market.fee_rate(), 1_000);
    }

    #[test]
    fn events_are_sealed_with_dense_sequence() {
        let mut market = marketplace();
        let seller = AgentId::new();
        market.register_agent(seller, "vendor").unwrap();
        market
            .create_listing(seller, 10, ArtifactKind::Prompt, "ipfs://p")
            .unwrap();

        let events = market.drain_events();
        assert_eq!(events.len(), 2);
        for (i, record) in events.iter().enumerate() {
            assert_eq!(record.seq, u64::try_from(i).unwrap());
            assert!(record.verify(), "digest must verify for seq {i}");
        }
        assert_eq!(events[0].event.kind(), "agent_registered");
        assert_eq!(events[1].event.kind(), "listing_created");

        // Draining empties the outbox; sequence keeps growing.
        assert_eq!(market.pending_events().count(), 0);
        market
            .create_listing(seller, 20, ArtifactKind::Data, "ipfs://d")
            .unwrap();
        assert_eq!(market.drain_events()[0].seq, 2);
    }

    #[test]
    fn idempotent_reregistration_emits_nothing() {
        let mut market = marketplace();
        let agent = AgentId::new();
        market.register_agent(agent, "echo").unwrap();
        market.drain_events();

        market.register_agent(agent, "echo").unwrap();
        assert_eq!(market.pending_events().count(), 0);
    }
}
