//! Debounced, event-driven watches over derived ledger state.
//!
//! Each watch operation on [`LedgerObserver`]:
//! - Registers one or more event filters with the chain client
//! - Funnels every matching event into a single [`Coalescer`]
//! - Re-reads the derived quantity through the [`ReaderBridge`] once the
//!   event burst has gone quiet, pinned to the newest block seen
//! - Returns a [`WatchHandle`] that removes every registration it made
//!
//! Registration happens synchronously inside the watch call, so no event
//! emitted after the call returns can be missed.

pub mod bridge;
pub mod coalescer;
pub mod error;
pub mod handle;
pub mod observer;
pub mod registry;

pub use bridge::{DerivedState, ReaderBridge, StateCallback};
pub use coalescer::{Coalescer, DebounceState, Debouncer};
pub use error::{DisposeError, WatchError};
pub use handle::{Registration, WatchHandle, WatchId, WatchSet};
pub use observer::LedgerObserver;
pub use registry::{Route, Routes};
