//! Event plumbing between the chain client and the coalescers.
//!
//! # Event Flow
//!
//! 1. The chain client delivers a `LedgerEvent` to a registered `Listener`
//! 2. The listener evaluates its route's [`EventPredicate`], if any
//! 3. Accepted events push their block number into a block signal channel
//! 4. The watch's coalescer drains the channel and, once quiet, triggers one read
//!
//! Signals carry only the block number; the read fetches everything else.

pub mod channels;
pub mod predicate;

pub use channels::{
    BlockSignalReceiver, BlockSignalSender, ShutdownReceiver, ShutdownSender,
    block_signal_channel, shutdown_channel,
};
pub use predicate::EventPredicate;
