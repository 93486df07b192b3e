//! The chain-client seam.
//!
//! A chain client is anything that can push [`LedgerEvent`]s to registered
//! listeners ([`EventSource`]) and answer point-in-time queries about the
//! protocol's state ([`LiquityReader`]). Transport, retries and contract call
//! encoding live behind these traits and are not modelled here.
//!
//! [`LedgerEvent`]: crate::objects::LedgerEvent

mod filter;
mod listener;

pub use filter::EventFilter;
pub use listener::{Listener, ListenerId};

use crate::objects::{
    Address, BlockTag, Decimal, EventName, StabilityDeposit, Trove, TroveWithPendingRewards,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a chain client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A point-in-time read was rejected.
    #[error("read {operation} failed: {message}")]
    Read {
        operation: &'static str,
        message: String,
    },

    /// A listener could not be removed.
    #[error("failed to unsubscribe from {event}: {message}")]
    Unsubscribe { event: EventName, message: String },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Push side of a chain client.
///
/// Registration is synchronous so that a listener is live by the time
/// [`subscribe`](EventSource::subscribe) returns.
pub trait EventSource: Send + Sync {
    /// Deliver every future event matching `filter` to `listener`.
    fn subscribe(&self, filter: EventFilter, listener: Listener);

    /// Remove the registration of `listener` under `filter`.
    ///
    /// Removing a registration that does not exist is not an error.
    fn unsubscribe(&self, filter: &EventFilter, listener: &Listener) -> Result<(), ChainError>;
}

/// Read side of a chain client.
///
/// Every query is pinned to a [`BlockTag`] so callers can read the state a
/// given event left behind.
#[async_trait]
pub trait LiquityReader: Send + Sync {
    /// Collateral and debt redistributed to all troves so far.
    async fn get_total_redistributed(&self, at: BlockTag) -> Result<Trove, ChainError>;

    /// A trove as stored, without applying pending rewards.
    async fn get_trove_without_rewards(
        &self,
        owner: &Address,
        at: BlockTag,
    ) -> Result<TroveWithPendingRewards, ChainError>;

    async fn get_number_of_troves(&self, at: BlockTag) -> Result<u64, ChainError>;

    /// Spot price of the collateral in LUSD.
    async fn get_price(&self, at: BlockTag) -> Result<Decimal, ChainError>;

    /// Aggregate collateral and debt of every trove.
    async fn get_total(&self, at: BlockTag) -> Result<Trove, ChainError>;

    async fn get_stability_deposit(
        &self,
        depositor: &Address,
        at: BlockTag,
    ) -> Result<StabilityDeposit, ChainError>;

    /// LUSD held by the stability pool.
    async fn get_lusd_in_stability_pool(&self, at: BlockTag) -> Result<Decimal, ChainError>;

    async fn get_lusd_balance(&self, owner: &Address, at: BlockTag) -> Result<Decimal, ChainError>;
}
