//! Watch handles and disposal.

use crate::events::ShutdownSender;
use crate::watch::error::DisposeError;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{info, warn};
use trovewatch_sdk::chain::{EventFilter, EventSource, Listener};
use uuid::Uuid;

/// Identity of one registered watch, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(Uuid);

impl WatchId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A listener registered with the chain client under one filter.
#[derive(Debug, Clone)]
pub struct Registration {
    pub filter: EventFilter,
    pub listener: Listener,
}

/// Owner of everything one watch registered.
///
/// [`dispose`](WatchHandle::dispose) stops the watch's coalescer and removes
/// each registration exactly once. Dropping the handle disposes it.
pub struct WatchHandle {
    id: WatchId,
    quantity: &'static str,
    events: Arc<dyn EventSource>,
    registrations: SmallVec<[Registration; 2]>,
    shutdown_tx: ShutdownSender,
}

impl WatchHandle {
    pub(crate) fn new(
        id: WatchId,
        quantity: &'static str,
        events: Arc<dyn EventSource>,
        registrations: SmallVec<[Registration; 2]>,
        shutdown_tx: ShutdownSender,
    ) -> Self {
        Self {
            id,
            quantity,
            events,
            registrations,
            shutdown_tx,
        }
    }

    pub fn id(&self) -> WatchId {
        self.id
    }

    /// Name of the watched quantity.
    pub fn quantity(&self) -> &'static str {
        self.quantity
    }

    /// Registrations not yet removed.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn is_disposed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stop the watch and remove its registrations.
    ///
    /// Every registration is attempted even if some fail; the failures are
    /// returned together. Calling this again is a no-op, including for
    /// registrations that failed to be removed the first time.
    pub fn dispose(&mut self) -> Result<(), DisposeError> {
        if self.is_disposed() {
            return Ok(());
        }
        self.shutdown_tx.send_replace(true);

        let mut failures = Vec::new();
        for registration in self.registrations.drain(..) {
            if let Err(e) = self
                .events
                .unsubscribe(&registration.filter, &registration.listener)
            {
                warn!(
                    watch = %self.id,
                    event = %registration.filter.event,
                    error = %e,
                    "Failed to remove listener registration"
                );
                failures.push(e);
            }
        }

        info!(
            watch = %self.id,
            quantity = self.quantity,
            failed = failures.len(),
            "Watch disposed"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DisposeError { failures })
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!(watch = %self.id, error = %e, "Watch dropped with leftover registrations");
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id)
            .field("quantity", &self.quantity)
            .field("registrations", &self.registrations.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A group of watches disposed together.
#[derive(Debug, Default)]
pub struct WatchSet {
    handles: Vec<WatchHandle>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: WatchHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Dispose every watch in the set, collecting failures from all of them.
    pub fn dispose(&mut self) -> Result<(), DisposeError> {
        let mut failures = Vec::new();
        for mut handle in self.handles.drain(..) {
            if let Err(e) = handle.dispose() {
                failures.extend(e.failures);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DisposeError { failures })
        }
    }
}

impl Extend<WatchHandle> for WatchSet {
    fn extend<I: IntoIterator<Item = WatchHandle>>(&mut self, iter: I) {
        self.handles.extend(iter);
    }
}
