//! Runtime configuration for the observer.

use std::time::Duration;

/// Debounce window applied when no other value is configured.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Settings shared by every watch a [`LedgerObserver`] registers.
///
/// [`LedgerObserver`]: crate::watch::LedgerObserver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Quiet period after the last matching event before state is re-read.
    pub debounce_window: Duration,
}

impl ObserverConfig {
    pub fn new(debounce_window: Duration) -> Self {
        Self { debounce_window }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
