//! Debounce coalescer.
//!
//! Collapses a burst of ledger events into one trailing trigger. The state
//! machine lives in [`Debouncer`] so the window logic can be exercised with
//! explicit instants; [`Coalescer`] drives it from a block signal channel and
//! a timer.

use crate::events::{BlockSignalReceiver, ShutdownReceiver};
use crate::watch::WatchId;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::debug;
use trovewatch_sdk::objects::{BlockNumber, BlockTag};

/// Whether a trailing trigger is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { deadline: Instant },
}

/// Debounce state machine for one watch.
///
/// The highest block number observed is kept across windows and only ever
/// grows. Events without a block number re-arm the window but leave it
/// untouched.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
    latest_block: Option<BlockNumber>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
            latest_block: None,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn latest_block(&self) -> Option<BlockNumber> {
        self.latest_block
    }

    /// Instant the pending window closes at.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline } => Some(deadline),
        }
    }

    /// Earliest instant at which [`fire`](Self::fire) succeeds.
    pub fn wake_at(&self) -> Option<Instant> {
        self.deadline()
            .map(|deadline| deadline + Duration::from_nanos(1))
    }

    /// An event arrived at `now`; (re)arm the window.
    pub fn observe(&mut self, now: Instant, block: Option<BlockNumber>) {
        if let Some(block) = block {
            self.latest_block = Some(self.latest_block.map_or(block, |seen| seen.max(block)));
        }
        self.state = DebounceState::Pending {
            deadline: now + self.window,
        };
    }

    /// The timer went off at `now`.
    ///
    /// Returns the block to read at if the window has closed, moving back to
    /// idle; returns `None` if nothing is pending or the window was extended.
    /// The window closes strictly after its deadline, so a timer landing
    /// exactly on it does not fire.
    pub fn fire(&mut self, now: Instant) -> Option<BlockTag> {
        match self.state {
            DebounceState::Pending { deadline } if now > deadline => {
                self.state = DebounceState::Idle;
                Some(BlockTag::from(self.latest_block))
            }
            _ => None,
        }
    }
}

/// Runner for one watch's [`Debouncer`].
///
/// Receives block signals from the watch's listeners and calls `on_fire`
/// once per quiet period. Stops when the watch is disposed or every
/// listener is gone; a window still pending at that point is dropped.
pub struct Coalescer<F> {
    watch: WatchId,
    debouncer: Debouncer,
    signal_rx: BlockSignalReceiver,
    shutdown_rx: ShutdownReceiver,
    on_fire: F,
}

impl<F> Coalescer<F>
where
    F: FnMut(BlockTag) + Send + 'static,
{
    pub fn new(
        watch: WatchId,
        window: Duration,
        signal_rx: BlockSignalReceiver,
        shutdown_rx: ShutdownReceiver,
        on_fire: F,
    ) -> Self {
        Self {
            watch,
            debouncer: Debouncer::new(window),
            signal_rx,
            shutdown_rx,
            on_fire,
        }
    }

    /// Run until the watch is disposed.
    pub async fn run(mut self) {
        let watch = self.watch;
        debug!(%watch, "Coalescer started");

        loop {
            let wake_at = self.debouncer.wake_at();

            tokio::select! {
                biased;

                // Disposal has highest priority.
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        debug!(%watch, "Coalescer received shutdown signal");
                        break;
                    }
                }

                // Events extend the window before a due timer can fire.
                signal = self.signal_rx.recv() => match signal {
                    Some(block) => {
                        self.debouncer.observe(Instant::now(), block);
                        debug!(%watch, ?block, latest = ?self.debouncer.latest_block(), "Debounce window armed");
                    }
                    None => {
                        debug!(%watch, "Block signal channel closed");
                        break;
                    }
                },

                _ = sleep_until(wake_at.unwrap_or_else(Instant::now)), if wake_at.is_some() => {
                    if let Some(at) = self.debouncer.fire(Instant::now()) {
                        debug!(%watch, block = %at, "Debounce window closed");
                        (self.on_fire)(at);
                    }
                }
            }
        }

        debug!(%watch, "Coalescer stopped");
    }
}
