//! Auction state machine.
//!
//! [`AuctionEngine`] orchestrates the pure pieces (validator, increment
//! policy, soft-close extender, clock) into the single write path for bids
//! and end-time changes. No other component appends a [`Bid`] or moves
//! `end_at`.
//!
//! The engine is designed for dependency injection: any storage implementing
//! [`AuctionStore`] and any eligibility source implementing
//! [`EligibilityCheck`] can be plugged in. There are no internal threads or
//! background loops; `Ended` is a derived fact of the clock, and every
//! operation is a plain async call that suspends only on the storage
//! transaction.
//!
//! # Example
//! ```no_run
//! # use std::sync::Arc;
//! # use auction_engine::*;
//! # #[tokio::main]
//! # async fn main() -> Result<(), EngineError> {
//! let engine = AuctionEngine::new(
//!     MemoryAuctionStore::new(),
//!     OpenEligibility,
//!     Arc::new(SystemClock),
//!     EngineConfig::default(),
//! );
//!
//! let auction = engine
//!     .create_auction(CreateAuction {
//!         listing_id: ListingId::new(),
//!         seller_id: UserId::new(),
//!         starting_price: 10_000,
//!         start_at: None,
//!         duration: chrono::Duration::hours(24),
//!         min_increment: None,
//!         soft_close_window_secs: None,
//!         soft_close_extension_secs: None,
//!         deposit_required: false,
//!     })
//!     .await?;
//!
//! match engine.submit_bid(auction.id, UserId::new(), 11_000).await? {
//!     BidOutcome::Accepted(accepted) => println!("high bid, ends {}", accepted.end_at),
//!     BidOutcome::Rejected(rejection) => println!("rejected: {rejection}"),
//! }
//! # Ok(()) }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::auction::{Auction, AuctionStatus, Bid, CreateAuction};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::eligibility::EligibilityCheck;
use crate::error::EngineError;
use crate::events::AuctionEvent;
use crate::increment::minimum_next_bid;
use crate::soft_close::extended_end_at;
use crate::store::{AuctionSnapshot, AuctionStore};
use crate::types::{AuctionId, BidId, UserId};
use crate::validator::{validate_bid, BidRejected};

/* -------------------------------------------------------------------------- */
/*                               Outcome types                                */
/* -------------------------------------------------------------------------- */

/// A successfully persisted bid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidAccepted {
    pub bid: Bid,
    /// The auction's end time after the soft-close rule, possibly unchanged.
    pub end_at: DateTime<Utc>,
    /// Whether this bid pushed the end time out.
    pub extended: bool,
}

/// The decision for one submission. Both arms are expected outcomes;
/// infrastructure failures surface separately as [`EngineError`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BidOutcome {
    Accepted(BidAccepted),
    Rejected(BidRejected),
}

/* -------------------------------------------------------------------------- */
/*                                AuctionEngine                               */
/* -------------------------------------------------------------------------- */

/// Orchestrates bid submission against a transactional store.
pub struct AuctionEngine<S, E> {
    store: Arc<S>,
    eligibility: Arc<E>,
    clock: Arc<dyn Clock>,
    defaults: EngineConfig,
    event_tx: broadcast::Sender<AuctionEvent>,
}

impl<S, E> Clone for AuctionEngine<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            eligibility: Arc::clone(&self.eligibility),
            clock: Arc::clone(&self.clock),
            defaults: self.defaults.clone(),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<S: AuctionStore, E: EligibilityCheck> AuctionEngine<S, E> {
    /// Builds an engine from its collaborators and explicit configuration.
    pub fn new(store: S, eligibility: E, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            store: Arc::new(store),
            eligibility: Arc::new(eligibility),
            clock,
            defaults: config,
            event_tx,
        }
    }

    /// Subscribe to auction events (fire-and-forget delivery).
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.event_tx.subscribe()
    }

    /* ----------------------------- API methods ----------------------------- */

    /// Creates an auction, validating its configuration once so bid-time code
    /// never re-validates. Unset knobs fall back to the engine defaults.
    #[instrument(skip(self, params), fields(listing = %params.listing_id))]
    pub async fn create_auction(&self, params: CreateAuction) -> Result<Auction, EngineError> {
        let now = self.clock.now();
        let start_at = params.start_at.unwrap_or(now);
        let end_at = start_at + params.duration;
        let min_increment = params.min_increment.unwrap_or(self.defaults.min_increment);
        let window = params
            .soft_close_window_secs
            .unwrap_or(self.defaults.soft_close_window_secs);
        let extension = params
            .soft_close_extension_secs
            .unwrap_or(self.defaults.soft_close_extension_secs);

        if end_at <= start_at {
            return Err(EngineError::InvalidAuction(
                "end time must be after start time".into(),
            ));
        }
        if params.starting_price == 0 {
            return Err(EngineError::InvalidAuction(
                "starting price must be positive".into(),
            ));
        }
        min_increment.validate().map_err(EngineError::InvalidAuction)?;
        if window > 0 && extension == 0 {
            return Err(EngineError::InvalidAuction(
                "soft-close extension must be positive when a window is set".into(),
            ));
        }

        let auction = Auction {
            id: AuctionId::new(),
            listing_id: params.listing_id,
            seller_id: params.seller_id,
            start_at,
            end_at,
            cancelled_at: None,
            min_increment,
            soft_close_window_secs: window,
            soft_close_extension_secs: extension,
            starting_price: params.starting_price,
            deposit_required: params.deposit_required,
            created_at: now,
        };
        self.store.insert_auction(auction.clone()).await?;

        info!(auction = %auction.id, start = %start_at, end = %end_at, "auction created");
        self.emit(AuctionEvent::Created {
            auction_id: auction.id,
        });
        Ok(auction)
    }

    /// Submits a bid. The sole entry point that appends bids and moves end
    /// times.
    ///
    /// The auction row is read for update, the validator decides against the
    /// true high bid, and on acceptance the bid row plus any soft-close
    /// extension commit atomically. Rejections come back as
    /// [`BidOutcome::Rejected`]; only infrastructure failures are `Err`, and
    /// the engine never retries internally. On an ambiguous failure the
    /// caller must treat the outcome as unknown rather than resubmit blindly.
    #[instrument(skip(self), fields(auction = %auction_id, bidder = %bidder_id))]
    pub async fn submit_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: u64,
    ) -> Result<BidOutcome, EngineError> {
        // Collaborator call stays outside the transaction so the row lock is
        // held only for the validate-and-write window.
        let eligible = self
            .eligibility
            .is_bidder_eligible(auction_id, bidder_id)
            .await;

        let mut txn = self
            .store
            .begin(auction_id)
            .await?
            .ok_or(EngineError::AuctionNotFound(auction_id))?;
        let now = self.clock.now();
        let auction = txn.auction().clone();
        let current_high = txn.current_high_bid().cloned();

        if let Err(rejection) =
            validate_bid(&auction, current_high.as_ref(), amount, eligible, now)
        {
            txn.rollback().await?;
            debug!(%rejection, amount, "bid rejected");
            return Ok(BidOutcome::Rejected(rejection));
        }

        let end_at = extended_end_at(
            auction.end_at,
            now,
            auction.soft_close_window_secs,
            auction.soft_close_extension_secs,
        );
        let extended = end_at > auction.end_at;

        let bid = Bid {
            id: BidId::new(),
            auction_id,
            bidder_id,
            amount,
            placed_at: now,
        };
        txn.insert_bid(bid.clone()).await?;
        if extended {
            txn.update_end_at(end_at).await?;
        }
        txn.commit().await?;

        info!(bid = %bid.id, amount, extended, "bid accepted");
        self.emit(AuctionEvent::BidPlaced {
            auction_id,
            bidder_id,
            amount,
        });
        if extended {
            self.emit(AuctionEvent::Extended { auction_id, end_at });
        }

        Ok(BidOutcome::Accepted(BidAccepted {
            bid,
            end_at,
            extended,
        }))
    }

    /// The live floor: what the next bid must at least be. Read-only, for
    /// display paths; takes no row lock.
    pub async fn minimum_next_bid(&self, auction_id: AuctionId) -> Result<u64, EngineError> {
        let snapshot = self
            .store
            .snapshot(auction_id)
            .await?
            .ok_or(EngineError::AuctionNotFound(auction_id))?;
        Ok(minimum_next_bid(
            snapshot.high_bid.map(|bid| bid.amount),
            snapshot.auction.starting_price,
            snapshot.auction.min_increment,
        ))
    }

    /// Read-only snapshot of the auction and its current high bid.
    pub async fn auction(&self, auction_id: AuctionId) -> Result<AuctionSnapshot, EngineError> {
        self.store
            .snapshot(auction_id)
            .await?
            .ok_or(EngineError::AuctionNotFound(auction_id))
    }

    /// Cancels an auction before any bids were placed. Only the seller may
    /// cancel, and only from `scheduled` or `active`. Cancellation is
    /// terminal: every later submission rejects with `AuctionNotActive`.
    #[instrument(skip(self), fields(auction = %auction_id))]
    pub async fn cancel_auction(
        &self,
        auction_id: AuctionId,
        requester: UserId,
    ) -> Result<(), EngineError> {
        let mut txn = self
            .store
            .begin(auction_id)
            .await?
            .ok_or(EngineError::AuctionNotFound(auction_id))?;
        let now = self.clock.now();
        let auction = txn.auction().clone();

        if auction.seller_id != requester {
            txn.rollback().await?;
            return Err(EngineError::NotPermitted(
                "only the seller may cancel an auction".into(),
            ));
        }
        let status = auction.status(now);
        if !matches!(status, AuctionStatus::Scheduled | AuctionStatus::Active) {
            txn.rollback().await?;
            return Err(EngineError::InvalidTransition(format!(
                "cannot cancel an auction in status {status}"
            )));
        }
        if txn.current_high_bid().is_some() {
            txn.rollback().await?;
            return Err(EngineError::InvalidTransition(
                "cannot cancel an auction with bids".into(),
            ));
        }

        txn.set_cancelled(now).await?;
        txn.commit().await?;

        info!("auction cancelled");
        self.emit(AuctionEvent::Cancelled { auction_id });
        Ok(())
    }

    /* ------------------------------- Internals ------------------------------ */

    fn emit(&self, event: AuctionEvent) {
        // Fire-and-forget: an engine with no subscribers must still work.
        if self.event_tx.send(event).is_err() {
            debug!("no active event subscribers, dropping event");
        }
    }
}

impl AuctionEngine<crate::store::MemoryAuctionStore, crate::eligibility::OpenEligibility> {
    /// Convenience constructor for tests and local development: in-memory
    /// store, open eligibility, wall clock.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(
            crate::store::MemoryAuctionStore::new(),
            crate::eligibility::OpenEligibility,
            Arc::new(crate::clock::SystemClock),
            config,
        )
    }
}
