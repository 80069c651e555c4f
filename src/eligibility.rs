//! Bidder eligibility collaborator.
//!
//! Whether a party may bid at all is decided outside this crate: deposit
//! authorization, KYC status, and terms acceptance all live in the
//! surrounding application. The engine consumes the answer as a plain
//! boolean fact, queried before the storage transaction opens so the
//! transaction stays short.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{AuctionId, UserId};

/// Answers "may this bidder place bids on this auction right now".
///
/// The trait is async because real implementations sit on deposit or KYC
/// services. An implementation that cannot reach its backing service decides
/// its own fail-open or fail-closed policy.
#[async_trait]
pub trait EligibilityCheck: Send + Sync + 'static {
    async fn is_bidder_eligible(&self, auction_id: AuctionId, bidder_id: UserId) -> bool;
}

/// Lets everyone bid. For auctions without deposit requirements, and for
/// tests and local development.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenEligibility;

#[async_trait]
impl EligibilityCheck for OpenEligibility {
    async fn is_bidder_eligible(&self, _auction_id: AuctionId, _bidder_id: UserId) -> bool {
        true
    }
}

/// A fixed allow-list, independent of the auction. Meant for tests and local
/// development, not production.
#[derive(Clone, Debug, Default)]
pub struct StaticEligibility {
    eligible: HashSet<UserId>,
}

impl StaticEligibility {
    pub fn allowing<I: IntoIterator<Item = UserId>>(bidders: I) -> Self {
        Self {
            eligible: bidders.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EligibilityCheck for StaticEligibility {
    async fn is_bidder_eligible(&self, _auction_id: AuctionId, bidder_id: UserId) -> bool {
        self.eligible.contains(&bidder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_allow_list() {
        let allowed = UserId::new();
        let denied = UserId::new();
        let check = StaticEligibility::allowing([allowed]);

        let auction_id = AuctionId::new();
        assert!(check.is_bidder_eligible(auction_id, allowed).await);
        assert!(!check.is_bidder_eligible(auction_id, denied).await);
    }
}
