//! Error taxonomy.
//!
//! Expected business outcomes (a rejected bid) are not errors; they are
//! returned as [`crate::validator::BidRejected`] values. The enums here cover
//! infrastructure failures and precondition violations only.

use thiserror::Error;

use crate::types::AuctionId;

/// Failures surfaced by an [`crate::store::AuctionStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or the transaction failed for
    /// infrastructure reasons. Retryable by the caller.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A row constraint was violated (duplicate auction id, missing row on
    /// write). Not retryable as-is.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Failures surfaced by [`crate::engine::AuctionEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("auction {0} not found")]
    AuctionNotFound(AuctionId),

    /// Auction-creation parameters failed validation. Strategy and timing
    /// configuration is checked once here and assumed valid on every bid.
    #[error("invalid auction: {0}")]
    InvalidAuction(String),

    /// The requester is not allowed to perform this administrative action.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// The auction is not in a state that allows the requested transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transactional read or write failed. Retryable, ideally with an
    /// idempotency key: on an ambiguous failure the transaction may have
    /// committed, and a blind resubmission could double-accept.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}
