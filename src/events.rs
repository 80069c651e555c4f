//! Domain events emitted by the engine.
//!
//! Events are published on a `tokio::sync::broadcast` channel (see
//! [`crate::engine::AuctionEngine::subscribe`]). Delivery is fire-and-forget:
//! an engine with no subscribers still accepts bids, and slow subscribers may
//! observe lagged receives per the broadcast channel's semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AuctionId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AuctionEvent {
    Created {
        auction_id: AuctionId,
    },
    BidPlaced {
        auction_id: AuctionId,
        bidder_id: UserId,
        amount: u64,
    },
    /// The soft-close rule pushed the end time out.
    Extended {
        auction_id: AuctionId,
        end_at: DateTime<Utc>,
    },
    Cancelled {
        auction_id: AuctionId,
    },
}
