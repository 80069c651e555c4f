//! Auction bidding and timing core.
//!
//! The rules that decide whether a bid is valid, how the minimum next bid is
//! computed, and how soft-close extensions keep last-second sniping from
//! working. Persistence and money movement stay behind collaborator traits:
//! any transactional store can implement [`AuctionStore`], any deposit/KYC
//! subsystem can implement [`EligibilityCheck`], and the [`Clock`] is
//! injected so every rule is testable against a simulated timeline.
//!
//! This crate is a library, not a service: the single mutating entry point
//! is [`AuctionEngine::submit_bid`], and [`AuctionEngine::minimum_next_bid`]
//! exposes the live floor for display. The pure pieces (validator, increment
//! policy, soft-close extender) are usable on their own.

#![forbid(unsafe_code)]
#![warn(unreachable_pub)]

// ─────────────────────────────────────────────────────────────────────────────
// MODULE DECLARATIONS
// ─────────────────────────────────────────────────────────────────────────────

pub mod auction;
pub mod clock;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod events;
pub mod increment;
pub mod soft_close;
pub mod store;
pub mod types;
pub mod validator;

// ─────────────────────────────────────────────────────────────────────────────
// PUBLIC RE-EXPORTS
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::{
    auction::{Auction, AuctionStatus, Bid, CreateAuction, MinIncrementStrategy},
    clock::{Clock, ManualClock, SystemClock},
    config::{load_configuration, EngineConfig},
    eligibility::{EligibilityCheck, OpenEligibility, StaticEligibility},
    engine::{AuctionEngine, BidAccepted, BidOutcome},
    error::{EngineError, StoreError},
    events::AuctionEvent,
    store::{AuctionSnapshot, AuctionStore, AuctionTxn, MemoryAuctionStore},
    types::{AuctionId, BidId, ListingId, UserId},
    validator::BidRejected,
};
