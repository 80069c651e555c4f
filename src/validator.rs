//! Bid validation: the pure accept/reject decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auction::{Auction, AuctionStatus, Bid};
use crate::increment::minimum_next_bid;

/// Why a submission was turned down.
///
/// Rejections are ordinary values, not errors: `submit_bid` returns them in
/// its `Ok` channel so callers handle every case exhaustively. The engine
/// never formats user-facing text; the `Display` strings here are for logs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BidRejected {
    /// The auction is scheduled, ended, or cancelled. Not retryable against
    /// this auction.
    #[error("auction is not active (status {status})")]
    AuctionNotActive { status: AuctionStatus },
    /// The eligibility collaborator said no (deposit, KYC, terms). Resolved
    /// outside this crate.
    #[error("bidder is not eligible")]
    BidderNotEligible,
    /// The amount is below the floor. Retryable with at least
    /// `minimum_next_bid`.
    #[error("bid below minimum next bid of {minimum_next_bid}")]
    BidTooLow { minimum_next_bid: u64 },
}

/// Decides whether a proposed bid is acceptable against a snapshot of the
/// auction. Performs no writes and never suspends.
///
/// Checks run in a fixed order and the first failure wins: auction not
/// active, then bidder not eligible, then amount below the floor. A
/// `BidTooLow` rejection carries the computed floor so the caller can
/// re-prompt with the exact amount.
pub fn validate_bid(
    auction: &Auction,
    current_high: Option<&Bid>,
    proposed_amount: u64,
    bidder_eligible: bool,
    now: DateTime<Utc>,
) -> Result<(), BidRejected> {
    let status = auction.status(now);
    if status != AuctionStatus::Active {
        return Err(BidRejected::AuctionNotActive { status });
    }
    if !bidder_eligible {
        return Err(BidRejected::BidderNotEligible);
    }
    let floor = minimum_next_bid(
        current_high.map(|bid| bid.amount),
        auction.starting_price,
        auction.min_increment,
    );
    if proposed_amount < floor {
        return Err(BidRejected::BidTooLow {
            minimum_next_bid: floor,
        });
    }
    Ok(())
}
