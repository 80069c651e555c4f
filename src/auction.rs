//! Auction and bid domain model.
//!
//! All monetary amounts are integers in the auction currency's minor unit
//! (cents). All instants are UTC. An auction's lifecycle status is never
//! stored: it is derived from the injected clock plus the `cancelled_at`
//! override, so a row can never carry a stale status.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AuctionId, BidId, ListingId, UserId};

/// How the minimum acceptable next bid is derived from the current high bid.
///
/// Serialized as an adjacently tagged pair, e.g.
/// `{"kind": "percent", "value": 500}` for a 5% step or
/// `{"kind": "fixed", "value": 2500}` for a 25.00 step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MinIncrementStrategy {
    /// Percentage step in basis points (1 bps = 0.01%).
    Percent(u32),
    /// Flat step in minor currency units.
    Fixed(u64),
}

impl MinIncrementStrategy {
    /// Checks the configured step is usable. Run once when the auction is
    /// created; bid-time code assumes a validated strategy.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            MinIncrementStrategy::Percent(0) => {
                Err("percent increment must be at least 1 basis point".into())
            }
            MinIncrementStrategy::Fixed(0) => {
                Err("fixed increment must be at least 1 minor unit".into())
            }
            _ => Ok(()),
        }
    }
}

/// Derived auction lifecycle state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
    Cancelled,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuctionStatus::Scheduled => "scheduled",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A persisted auction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub listing_id: ListingId,
    pub seller_id: UserId,
    /// Immutable after creation.
    pub start_at: DateTime<Utc>,
    /// Mutable, but only ever moves forward (soft-close extension).
    pub end_at: DateTime<Utc>,
    /// Set when an administrative cancellation happened. Terminal.
    pub cancelled_at: Option<DateTime<Utc>>,
    pub min_increment: MinIncrementStrategy,
    /// A bid arriving within this many seconds of `end_at` extends the
    /// auction. Zero disables soft close.
    pub soft_close_window_secs: u64,
    /// How far past the accepting instant `end_at` is pushed when the
    /// extension triggers.
    pub soft_close_extension_secs: u64,
    /// Minimum valid first bid, in minor units.
    pub starting_price: u64,
    /// Whether bidders must hold an authorized deposit. Consumed by the
    /// eligibility collaborator, not by this crate.
    pub deposit_required: bool,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// Lifecycle status at `now`. `start_at` is inclusive, `end_at`
    /// exclusive; an explicit cancellation overrides the time window.
    pub fn status(&self, now: DateTime<Utc>) -> AuctionStatus {
        if self.cancelled_at.is_some() {
            AuctionStatus::Cancelled
        } else if now < self.start_at {
            AuctionStatus::Scheduled
        } else if now < self.end_at {
            AuctionStatus::Active
        } else {
            AuctionStatus::Ended
        }
    }

    /// Returns whether the auction is open for bids at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == AuctionStatus::Active
    }
}

/// An accepted bid. Rejected submissions are never persisted; they surface
/// only as a [`crate::validator::BidRejected`] value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    /// Minor currency units.
    pub amount: u64,
    pub placed_at: DateTime<Utc>,
}

/// Parameters for creating an auction.
///
/// Fields left as `None` fall back to the engine's configured defaults
/// ([`crate::config::EngineConfig`]).
#[derive(Clone, Debug)]
pub struct CreateAuction {
    pub listing_id: ListingId,
    pub seller_id: UserId,
    /// Minimum valid first bid, in minor units. Must be positive.
    pub starting_price: u64,
    /// When bidding opens. `None` means immediately.
    pub start_at: Option<DateTime<Utc>>,
    /// How long the auction stays open from `start_at`.
    pub duration: Duration,
    pub min_increment: Option<MinIncrementStrategy>,
    pub soft_close_window_secs: Option<u64>,
    pub soft_close_extension_secs: Option<u64>,
    pub deposit_required: bool,
}
