//! Storage collaborator: transactional access to auction rows.
//!
//! The engine never reads-then-writes outside a transaction boundary. A
//! [`AuctionTxn`] holds its auction row *for update* from [`AuctionStore::begin`]
//! until `commit` or `rollback`, so two concurrent submissions for the same
//! auction serialize on the row and each decides against the true high bid.
//! Distinct auctions proceed in parallel.
//!
//! Can be backed by Postgres (`SELECT ... FOR UPDATE`), or any store with an
//! equivalent row-lock or serializable-transaction primitive. The bundled
//! [`MemoryAuctionStore`] realizes the contract with one async mutex per row
//! and is meant for tests and local development, not production.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::auction::{Auction, Bid};
use crate::error::StoreError;
use crate::types::AuctionId;

/// Read-only view of an auction row and its current high bid.
#[derive(Clone, Debug, PartialEq)]
pub struct AuctionSnapshot {
    pub auction: Auction,
    pub high_bid: Option<Bid>,
}

/// Storage abstraction consumed by the engine.
#[async_trait]
pub trait AuctionStore: Send + Sync + 'static {
    /// Persists a freshly created auction row.
    async fn insert_auction(&self, auction: Auction) -> Result<(), StoreError>;

    /// Opens a transaction holding the auction row for update, or `None` if
    /// no such auction exists. The row stays locked until the returned
    /// handle commits, rolls back, or is dropped.
    async fn begin(&self, auction_id: AuctionId) -> Result<Option<Box<dyn AuctionTxn>>, StoreError>;

    /// Non-locking read for display paths (the live floor helper). May
    /// briefly wait on a concurrent writer but takes no lock of its own.
    async fn snapshot(&self, auction_id: AuctionId) -> Result<Option<AuctionSnapshot>, StoreError>;
}

/// An open transaction over a single auction row.
///
/// Writes are visible to later readers only after `commit`. Dropping the
/// handle without committing discards all staged writes, so an engine error
/// mid-transaction leaves the row untouched.
#[async_trait]
pub trait AuctionTxn: Send {
    /// The auction row as read under the lock.
    fn auction(&self) -> &Auction;

    /// Current high bid as read under the lock: greatest amount, earliest
    /// `placed_at` on a tie.
    fn current_high_bid(&self) -> Option<&Bid>;

    /// Appends an accepted bid.
    async fn insert_bid(&mut self, bid: Bid) -> Result<(), StoreError>;

    /// Moves the auction's end time. Callers only ever move it forward.
    async fn update_end_at(&mut self, end_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Marks the auction cancelled.
    async fn set_cancelled(&mut self, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/* --------------------------- In-memory implementation --------------------------- */

#[derive(Debug)]
struct AuctionRow {
    auction: Auction,
    bids: Vec<Bid>,
}

impl AuctionRow {
    fn high_bid(&self) -> Option<&Bid> {
        // Bids are appended in acceptance order, so keeping the first
        // strictly-greater amount realizes the earliest-on-tie rule.
        let mut best: Option<&Bid> = None;
        for bid in &self.bids {
            match best {
                Some(current) if bid.amount <= current.amount => {}
                _ => best = Some(bid),
            }
        }
        best
    }
}

type RowMap = HashMap<AuctionId, Arc<Mutex<AuctionRow>>>;

/// Thread-safe in-memory store. One async mutex per auction row stands in
/// for the database's row lock.
#[derive(Clone, Default)]
pub struct MemoryAuctionStore {
    rows: Arc<RwLock<RowMap>>,
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for MemoryAuctionStore {
    async fn insert_auction(&self, auction: Auction) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&auction.id) {
            return Err(StoreError::Constraint(format!(
                "auction {} already exists",
                auction.id
            )));
        }
        let id = auction.id;
        let row = AuctionRow {
            auction,
            bids: Vec::new(),
        };
        rows.insert(id, Arc::new(Mutex::new(row)));
        Ok(())
    }

    async fn begin(&self, auction_id: AuctionId) -> Result<Option<Box<dyn AuctionTxn>>, StoreError> {
        let row = {
            let rows = self.rows.read().await;
            match rows.get(&auction_id) {
                Some(row) => Arc::clone(row),
                None => return Ok(None),
            }
        };
        // Suspends here until any concurrent transaction on this row ends.
        let guard = row.lock_owned().await;
        Ok(Some(Box::new(MemoryTxn {
            guard,
            staged_bids: Vec::new(),
            staged_end_at: None,
            staged_cancelled_at: None,
        })))
    }

    async fn snapshot(&self, auction_id: AuctionId) -> Result<Option<AuctionSnapshot>, StoreError> {
        let row = {
            let rows = self.rows.read().await;
            match rows.get(&auction_id) {
                Some(row) => Arc::clone(row),
                None => return Ok(None),
            }
        };
        let guard = row.lock().await;
        Ok(Some(AuctionSnapshot {
            auction: guard.auction.clone(),
            high_bid: guard.high_bid().cloned(),
        }))
    }
}

struct MemoryTxn {
    guard: OwnedMutexGuard<AuctionRow>,
    staged_bids: Vec<Bid>,
    staged_end_at: Option<DateTime<Utc>>,
    staged_cancelled_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl AuctionTxn for MemoryTxn {
    fn auction(&self) -> &Auction {
        &self.guard.auction
    }

    fn current_high_bid(&self) -> Option<&Bid> {
        self.guard.high_bid()
    }

    async fn insert_bid(&mut self, bid: Bid) -> Result<(), StoreError> {
        self.staged_bids.push(bid);
        Ok(())
    }

    async fn update_end_at(&mut self, end_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.staged_end_at = Some(end_at);
        Ok(())
    }

    async fn set_cancelled(&mut self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.staged_cancelled_at = Some(at);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.guard.bids.append(&mut self.staged_bids);
        if let Some(end_at) = self.staged_end_at {
            self.guard.auction.end_at = end_at;
        }
        if let Some(at) = self.staged_cancelled_at {
            self.guard.auction.cancelled_at = Some(at);
        }
        Ok(())
        // Guard drops here, releasing the row.
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Staged writes are discarded with the handle.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::MinIncrementStrategy;
    use crate::types::{BidId, ListingId, UserId};
    use chrono::{Duration, TimeZone};

    fn sample_auction() -> Auction {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Auction {
            id: AuctionId::new(),
            listing_id: ListingId::new(),
            seller_id: UserId::new(),
            start_at: start,
            end_at: start + Duration::hours(1),
            cancelled_at: None,
            min_increment: MinIncrementStrategy::Fixed(100),
            soft_close_window_secs: 120,
            soft_close_extension_secs: 120,
            starting_price: 1000,
            deposit_required: false,
            created_at: start,
        }
    }

    fn bid(auction: &Auction, amount: u64, at: DateTime<Utc>) -> Bid {
        Bid {
            id: BidId::new(),
            auction_id: auction.id,
            bidder_id: UserId::new(),
            amount,
            placed_at: at,
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_constraint_violation() {
        let store = MemoryAuctionStore::new();
        let auction = sample_auction();
        store.insert_auction(auction.clone()).await.unwrap();
        assert!(matches!(
            store.insert_auction(auction).await,
            Err(StoreError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn commit_publishes_staged_writes() {
        let store = MemoryAuctionStore::new();
        let auction = sample_auction();
        store.insert_auction(auction.clone()).await.unwrap();

        let new_end = auction.end_at + Duration::seconds(60);
        let mut txn = store.begin(auction.id).await.unwrap().unwrap();
        txn.insert_bid(bid(&auction, 1000, auction.start_at)).await.unwrap();
        txn.update_end_at(new_end).await.unwrap();
        txn.commit().await.unwrap();

        let snap = store.snapshot(auction.id).await.unwrap().unwrap();
        assert_eq!(snap.auction.end_at, new_end);
        assert_eq!(snap.high_bid.unwrap().amount, 1000);
    }

    #[tokio::test]
    async fn rollback_and_drop_discard_staged_writes() {
        let store = MemoryAuctionStore::new();
        let auction = sample_auction();
        store.insert_auction(auction.clone()).await.unwrap();

        let mut txn = store.begin(auction.id).await.unwrap().unwrap();
        txn.insert_bid(bid(&auction, 1000, auction.start_at)).await.unwrap();
        txn.rollback().await.unwrap();

        let mut txn = store.begin(auction.id).await.unwrap().unwrap();
        txn.insert_bid(bid(&auction, 2000, auction.start_at)).await.unwrap();
        drop(txn);

        let snap = store.snapshot(auction.id).await.unwrap().unwrap();
        assert_eq!(snap.high_bid, None);
    }

    #[tokio::test]
    async fn begin_serializes_on_the_row() {
        let store = MemoryAuctionStore::new();
        let auction = sample_auction();
        store.insert_auction(auction.clone()).await.unwrap();

        let txn = store.begin(auction.id).await.unwrap().unwrap();

        // A second transaction must wait for the first to finish.
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            store.begin(auction.id),
        )
        .await;
        assert!(blocked.is_err(), "second begin acquired a held row lock");

        txn.rollback().await.unwrap();
        let reacquired = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            store.begin(auction.id),
        )
        .await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn high_bid_prefers_earliest_on_amount_tie() {
        let store = MemoryAuctionStore::new();
        let auction = sample_auction();
        store.insert_auction(auction.clone()).await.unwrap();

        let first = bid(&auction, 1500, auction.start_at);
        let second = bid(&auction, 1500, auction.start_at + Duration::seconds(10));
        let mut txn = store.begin(auction.id).await.unwrap().unwrap();
        txn.insert_bid(first.clone()).await.unwrap();
        txn.insert_bid(second).await.unwrap();
        txn.commit().await.unwrap();

        let snap = store.snapshot(auction.id).await.unwrap().unwrap();
        assert_eq!(snap.high_bid.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn missing_auction_reads_as_none() {
        let store = MemoryAuctionStore::new();
        let id = AuctionId::new();
        assert!(store.begin(id).await.unwrap().is_none());
        assert!(store.snapshot(id).await.unwrap().is_none());
    }
}
