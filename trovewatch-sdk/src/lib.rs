//! Shared types for trovewatch.
//!
//! This crate holds everything both sides of the chain-client seam need to
//! agree on: the domain objects read from the ledger, the typed event records
//! pushed by it, and the [`chain`] traits a ledger client implements. The
//! optional `memory` feature adds an in-memory ledger used by tests and by
//! the replay tool.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod chain;
#[cfg(feature = "memory")]
pub mod memory;
pub mod objects;
