//! Subscription registry.
//!
//! Wires a watch's filters to its coalescer and records every registration
//! in the returned [`WatchHandle`].

use crate::events::{BlockSignalSender, EventPredicate, block_signal_channel, shutdown_channel};
use crate::watch::bridge::{DerivedState, ReaderBridge, StateCallback};
use crate::watch::coalescer::Coalescer;
use crate::watch::error::WatchError;
use crate::watch::handle::{Registration, WatchHandle, WatchId};
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;
use trovewatch_sdk::chain::{EventFilter, EventSource, Listener, LiquityReader};

/// One filter feeding a watch, optionally narrowed by a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub filter: EventFilter,
    pub predicate: Option<EventPredicate>,
}

/// Routes of one watch. Almost every watch has one or two.
pub type Routes = SmallVec<[Route; 2]>;

impl Route {
    pub fn new(filter: EventFilter) -> Self {
        Self {
            filter,
            predicate: None,
        }
    }

    /// Only forward events for which `predicate` holds.
    pub fn when(mut self, predicate: EventPredicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Build the listener registered for this route.
    fn listener(&self, signal_tx: BlockSignalSender) -> Listener {
        let predicate = self.predicate.clone();
        Listener::new(move |event| {
            if predicate.as_ref().is_none_or(|p| p.matches(event)) {
                // The coalescer is gone once the watch is disposed; late
                // deliveries from the chain client are dropped here.
                let _ = signal_tx.send(event.block_number);
            }
        })
    }
}

/// Registers watches against one chain client.
#[derive(Clone)]
pub(crate) struct Registry {
    events: Arc<dyn EventSource>,
    reader: Arc<dyn LiquityReader>,
    debounce_window: Duration,
}

impl Registry {
    pub(crate) fn new(
        events: Arc<dyn EventSource>,
        reader: Arc<dyn LiquityReader>,
        debounce_window: Duration,
    ) -> Self {
        Self {
            events,
            reader,
            debounce_window,
        }
    }

    /// Spawn the watch's coalescer and register every route.
    ///
    /// Returns once all listeners are live.
    pub(crate) fn register<Q: DerivedState>(
        &self,
        quantity: Q,
        routes: Routes,
        callback: StateCallback<Q::Output>,
    ) -> Result<WatchHandle, WatchError> {
        let runtime = Handle::try_current().map_err(|_| WatchError::NoRuntime)?;

        let id = WatchId::generate();
        let name = quantity.name();
        let (signal_tx, signal_rx) = block_signal_channel();
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let bridge = ReaderBridge::new(
            id,
            quantity,
            Arc::clone(&self.reader),
            callback,
            shutdown_rx.clone(),
        );
        let coalescer = Coalescer::new(
            id,
            self.debounce_window,
            signal_rx,
            shutdown_rx,
            move |at| {
                bridge.trigger(at);
            },
        );
        runtime.spawn(coalescer.run());

        let registrations: SmallVec<[Registration; 2]> = routes
            .into_iter()
            .map(|route| {
                let listener = route.listener(signal_tx.clone());
                self.events.subscribe(route.filter.clone(), listener.clone());
                Registration {
                    filter: route.filter,
                    listener,
                }
            })
            .collect();

        info!(
            watch = %id,
            quantity = name,
            filters = registrations.len(),
            "Watch registered"
        );

        Ok(WatchHandle::new(
            id,
            name,
            Arc::clone(&self.events),
            registrations,
            shutdown_tx,
        ))
    }
}
