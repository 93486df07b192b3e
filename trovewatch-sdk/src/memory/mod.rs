//! In-memory ledger.
//!
//! [`MemoryLedger`] implements both halves of the chain-client seam over a
//! map of per-block state snapshots. Emitting an event folds it into the
//! snapshot for its block and then notifies every matching listener, which
//! makes it a deterministic stand-in for a live node in tests and replays.

mod state;

pub use state::LedgerState;

use crate::chain::{ChainError, EventFilter, EventSource, LiquityReader, Listener};
use crate::objects::{
    Address, BlockNumber, BlockTag, ContractAddresses, Decimal, EventName, LedgerEvent,
    StabilityDeposit, Trove, TroveWithPendingRewards,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Read operations served by [`MemoryLedger`], as recorded in its read log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadKind {
    TotalRedistributed,
    TroveWithoutRewards(Address),
    NumberOfTroves,
    Price,
    Total,
    StabilityDeposit(Address),
    LusdInStabilityPool,
    LusdBalance(Address),
}

impl ReadKind {
    fn operation(&self) -> &'static str {
        match self {
            ReadKind::TotalRedistributed => "total_redistributed",
            ReadKind::TroveWithoutRewards(_) => "trove_without_rewards",
            ReadKind::NumberOfTroves => "number_of_troves",
            ReadKind::Price => "price",
            ReadKind::Total => "total",
            ReadKind::StabilityDeposit(_) => "stability_deposit",
            ReadKind::LusdInStabilityPool => "lusd_in_stability_pool",
            ReadKind::LusdBalance(_) => "lusd_balance",
        }
    }
}

#[derive(Default)]
struct Faults {
    fail_reads: bool,
    fail_unsubscribe: HashSet<EventName>,
    read_delay: Option<Duration>,
}

/// A ledger held entirely in memory.
pub struct MemoryLedger {
    contracts: ContractAddresses,
    snapshots: Mutex<BTreeMap<BlockNumber, LedgerState>>,
    listeners: Mutex<Vec<(EventFilter, Listener)>>,
    reads: Mutex<Vec<(ReadKind, BlockTag)>>,
    faults: Mutex<Faults>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryLedger {
    /// Create a ledger whose genesis state (block 0) is empty.
    pub fn new(contracts: ContractAddresses) -> Self {
        Self::with_genesis(contracts, LedgerState::default())
    }

    pub fn with_genesis(contracts: ContractAddresses, genesis: LedgerState) -> Self {
        Self {
            contracts,
            snapshots: Mutex::new(BTreeMap::from([(0, genesis)])),
            listeners: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    /// Apply `event` to the state at its block and notify matching listeners.
    ///
    /// Events without a block number apply to the newest snapshot. An event
    /// for a block older than the newest snapshot is also folded into every
    /// later snapshot. Listeners run after the internal locks are released,
    /// so they may subscribe or unsubscribe re-entrantly.
    pub fn emit(&self, event: LedgerEvent) {
        {
            let mut snapshots = lock(&self.snapshots);
            let block = event
                .block_number
                .or_else(|| snapshots.keys().next_back().copied())
                .unwrap_or_default();
            let mut state = snapshots
                .range(..=block)
                .next_back()
                .map(|(_, state)| state.clone())
                .unwrap_or_default();
            state.apply(&self.contracts, &event.kind);
            snapshots.insert(block, state);
            for (_, later) in snapshots.range_mut((Excluded(block), Unbounded)) {
                later.apply(&self.contracts, &event.kind);
            }
        }

        let matching: Vec<Listener> = lock(&self.listeners)
            .iter()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, listener)| listener.clone())
            .collect();

        debug!(
            event = %event.name(),
            block = ?event.block_number,
            listeners = matching.len(),
            "Emitting ledger event"
        );

        for listener in matching {
            listener.notify(&event);
        }
    }

    /// Set the spot price from `block` onwards.
    pub fn set_price(&self, block: BlockNumber, price: Decimal) {
        let mut snapshots = lock(&self.snapshots);
        let mut state = snapshots
            .range(..=block)
            .next_back()
            .map(|(_, state)| state.clone())
            .unwrap_or_default();
        state.price = price;
        snapshots.insert(block, state);
        for (_, later) in snapshots.range_mut((Excluded(block), Unbounded)) {
            later.price = price;
        }
    }

    /// Snapshot of the state a read at `at` would observe.
    pub fn state_at(&self, at: BlockTag) -> LedgerState {
        let snapshots = lock(&self.snapshots);
        let found = match at {
            BlockTag::Latest => snapshots.values().next_back(),
            BlockTag::Number(n) => snapshots.range(..=n).next_back().map(|(_, state)| state),
        };
        found.cloned().unwrap_or_default()
    }

    /// Number of live (filter, listener) registrations.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Every read served so far, in arrival order.
    pub fn reads(&self) -> Vec<(ReadKind, BlockTag)> {
        lock(&self.reads).clone()
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) {
        lock(&self.faults).fail_reads = fail;
    }

    /// Make unsubscribing from `event` fail.
    pub fn fail_unsubscribe(&self, event: EventName) {
        lock(&self.faults).fail_unsubscribe.insert(event);
    }

    /// Hold every subsequent read for `delay` before answering.
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        lock(&self.faults).read_delay = delay;
    }

    async fn read<T>(
        &self,
        kind: ReadKind,
        at: BlockTag,
        extract: impl FnOnce(&LedgerState) -> T,
    ) -> Result<T, ChainError> {
        let (fail, delay) = {
            let faults = lock(&self.faults);
            (faults.fail_reads, faults.read_delay)
        };
        let operation = kind.operation();
        lock(&self.reads).push((kind, at));

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(ChainError::Read {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(extract(&self.state_at(at)))
    }
}

impl EventSource for MemoryLedger {
    fn subscribe(&self, filter: EventFilter, listener: Listener) {
        debug!(event = %filter.event, listener = %listener.id(), "Listener subscribed");
        lock(&self.listeners).push((filter, listener));
    }

    fn unsubscribe(&self, filter: &EventFilter, listener: &Listener) -> Result<(), ChainError> {
        if lock(&self.faults).fail_unsubscribe.contains(&filter.event) {
            return Err(ChainError::Unsubscribe {
                event: filter.event,
                message: "injected failure".to_string(),
            });
        }
        lock(&self.listeners).retain(|(f, l)| !(f == filter && l == listener));
        debug!(event = %filter.event, listener = %listener.id(), "Listener unsubscribed");
        Ok(())
    }
}

#[async_trait]
impl LiquityReader for MemoryLedger {
    async fn get_total_redistributed(&self, at: BlockTag) -> Result<Trove, ChainError> {
        self.read(ReadKind::TotalRedistributed, at, |s| s.total_redistributed)
            .await
    }

    async fn get_trove_without_rewards(
        &self,
        owner: &Address,
        at: BlockTag,
    ) -> Result<TroveWithPendingRewards, ChainError> {
        self.read(ReadKind::TroveWithoutRewards(owner.clone()), at, |s| {
            s.troves.get(owner).copied().unwrap_or_default()
        })
        .await
    }

    async fn get_number_of_troves(&self, at: BlockTag) -> Result<u64, ChainError> {
        self.read(ReadKind::NumberOfTroves, at, |s| s.troves.len() as u64)
            .await
    }

    async fn get_price(&self, at: BlockTag) -> Result<Decimal, ChainError> {
        self.read(ReadKind::Price, at, |s| s.price).await
    }

    async fn get_total(&self, at: BlockTag) -> Result<Trove, ChainError> {
        self.read(ReadKind::Total, at, LedgerState::total).await
    }

    async fn get_stability_deposit(
        &self,
        depositor: &Address,
        at: BlockTag,
    ) -> Result<StabilityDeposit, ChainError> {
        self.read(ReadKind::StabilityDeposit(depositor.clone()), at, |s| {
            s.deposits.get(depositor).copied().unwrap_or_default()
        })
        .await
    }

    async fn get_lusd_in_stability_pool(&self, at: BlockTag) -> Result<Decimal, ChainError> {
        let pool = self.contracts.stability_pool.clone();
        self.read(ReadKind::LusdInStabilityPool, at, |s| s.lusd_balance(&pool))
            .await
    }

    async fn get_lusd_balance(&self, owner: &Address, at: BlockTag) -> Result<Decimal, ChainError> {
        self.read(ReadKind::LusdBalance(owner.clone()), at, |s| {
            s.lusd_balance(owner)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::EventKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn contracts() -> ContractAddresses {
        ContractAddresses {
            active_pool: Address::new("0x01"),
            default_pool: Address::new("0x02"),
            stability_pool: Address::new("0x03"),
            trove_manager: Address::new("0x04"),
            lusd_token: Address::new("0x05"),
        }
    }

    fn trove_updated(block: BlockNumber, borrower: &str, debt: i64) -> LedgerEvent {
        LedgerEvent::new(
            Address::new("0x04"),
            Some(block),
            EventKind::TroveUpdated {
                borrower: Address::new(borrower),
                debt: Decimal::from(debt),
                collateral: Decimal::ONE,
                stake: Decimal::ONE,
            },
        )
    }

    #[tokio::test]
    async fn test_reads_are_pinned_to_historical_blocks() {
        let ledger = MemoryLedger::new(contracts());
        ledger.emit(trove_updated(10, "0xa1", 100));
        ledger.emit(trove_updated(20, "0xa2", 300));

        assert_eq!(ledger.get_number_of_troves(BlockTag::Number(5)).await, Ok(0));
        assert_eq!(ledger.get_number_of_troves(BlockTag::Number(15)).await, Ok(1));
        assert_eq!(ledger.get_number_of_troves(BlockTag::Latest).await, Ok(2));
        assert_eq!(
            ledger.get_total(BlockTag::Number(20)).await.map(|t| t.debt),
            Ok(Decimal::from(400))
        );
        assert_eq!(ledger.reads().len(), 4);
    }

    #[tokio::test]
    async fn test_late_event_is_folded_into_later_blocks() {
        let ledger = MemoryLedger::new(contracts());
        ledger.emit(trove_updated(10, "0xa1", 100));
        ledger.emit(trove_updated(20, "0xa2", 300));
        ledger.emit(trove_updated(15, "0xa3", 50));

        assert_eq!(ledger.get_number_of_troves(BlockTag::Number(12)).await, Ok(1));
        assert_eq!(ledger.get_number_of_troves(BlockTag::Number(15)).await, Ok(2));
        assert_eq!(ledger.get_number_of_troves(BlockTag::Number(20)).await, Ok(3));
        assert_eq!(
            ledger.get_total(BlockTag::Latest).await.map(|t| t.debt),
            Ok(Decimal::from(450))
        );
    }

    #[test]
    fn test_price_at_last_block_does_not_overflow() {
        let ledger = MemoryLedger::new(contracts());
        ledger.set_price(u64::MAX, Decimal::from(2000));
        assert_eq!(ledger.state_at(BlockTag::Latest).price, Decimal::from(2000));
        assert_eq!(ledger.state_at(BlockTag::Number(5)).price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_only_matching_listeners_are_notified() {
        let ledger = MemoryLedger::new(contracts());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let listener = Listener::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let filter = EventFilter::trove_updated(&Address::new("0x04"), Some(&Address::new("0xa1")));
        ledger.subscribe(filter.clone(), listener.clone());

        ledger.emit(trove_updated(1, "0xa1", 100));
        ledger.emit(trove_updated(2, "0xa2", 100));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        ledger.unsubscribe(&filter, &listener).unwrap();
        assert_eq!(ledger.listener_count(), 0);
        ledger.emit(trove_updated(3, "0xa1", 200));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let ledger = MemoryLedger::new(contracts());
        ledger.fail_reads(true);
        assert!(matches!(
            ledger.get_price(BlockTag::Latest).await,
            Err(ChainError::Read { operation: "price", .. })
        ));

        ledger.fail_unsubscribe(EventName::Transfer);
        let filter = EventFilter::transfer(&Address::new("0x05"), None, None);
        let listener = Listener::new(|_| {});
        ledger.subscribe(filter.clone(), listener.clone());
        assert!(ledger.unsubscribe(&filter, &listener).is_err());
        assert_eq!(ledger.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_price_applies_to_later_snapshots() {
        let ledger = MemoryLedger::new(contracts());
        ledger.emit(trove_updated(10, "0xa1", 100));
        ledger.set_price(5, Decimal::from(2000));
        assert_eq!(ledger.state_at(BlockTag::Number(4)).price, Decimal::ZERO);
        assert_eq!(ledger.state_at(BlockTag::Number(10)).price, Decimal::from(2000));
    }
}
