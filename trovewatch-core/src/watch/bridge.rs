//! Reader bridge.
//!
//! Turns a coalesced trigger into exactly one pinned read against the chain
//! client and hands the result to the watch's callback. Each derived
//! quantity is a [`DerivedState`] implementation naming the read it needs.

use crate::events::ShutdownReceiver;
use crate::watch::WatchId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use trovewatch_sdk::chain::{ChainError, LiquityReader};
use trovewatch_sdk::objects::{
    Address, BlockTag, Decimal, StabilityDeposit, Trove, TroveWithPendingRewards,
};

/// Callback receiving each re-read of a watched quantity.
///
/// Failed reads are delivered as `Err`; they are not retried.
pub type StateCallback<T> = Arc<dyn Fn(Result<T, ChainError>) + Send + Sync>;

/// A quantity derived from ledger state that can be read at a given block.
#[async_trait]
pub trait DerivedState: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn read(
        &self,
        reader: &dyn LiquityReader,
        at: BlockTag,
    ) -> Result<Self::Output, ChainError>;
}

pub struct TotalRedistributed;

#[async_trait]
impl DerivedState for TotalRedistributed {
    type Output = Trove;

    fn name(&self) -> &'static str {
        "total_redistributed"
    }

    async fn read(&self, reader: &dyn LiquityReader, at: BlockTag) -> Result<Trove, ChainError> {
        reader.get_total_redistributed(at).await
    }
}

pub struct TroveWithoutRewards {
    pub owner: Address,
}

#[async_trait]
impl DerivedState for TroveWithoutRewards {
    type Output = TroveWithPendingRewards;

    fn name(&self) -> &'static str {
        "trove_without_rewards"
    }

    async fn read(
        &self,
        reader: &dyn LiquityReader,
        at: BlockTag,
    ) -> Result<TroveWithPendingRewards, ChainError> {
        reader.get_trove_without_rewards(&self.owner, at).await
    }
}

pub struct NumberOfTroves;

#[async_trait]
impl DerivedState for NumberOfTroves {
    type Output = u64;

    fn name(&self) -> &'static str {
        "number_of_troves"
    }

    async fn read(&self, reader: &dyn LiquityReader, at: BlockTag) -> Result<u64, ChainError> {
        reader.get_number_of_troves(at).await
    }
}

pub struct Total;

#[async_trait]
impl DerivedState for Total {
    type Output = Trove;

    fn name(&self) -> &'static str {
        "total"
    }

    async fn read(&self, reader: &dyn LiquityReader, at: BlockTag) -> Result<Trove, ChainError> {
        reader.get_total(at).await
    }
}

pub struct StabilityDepositOf {
    pub depositor: Address,
}

#[async_trait]
impl DerivedState for StabilityDepositOf {
    type Output = StabilityDeposit;

    fn name(&self) -> &'static str {
        "stability_deposit"
    }

    async fn read(
        &self,
        reader: &dyn LiquityReader,
        at: BlockTag,
    ) -> Result<StabilityDeposit, ChainError> {
        reader.get_stability_deposit(&self.depositor, at).await
    }
}

pub struct LusdInStabilityPool;

#[async_trait]
impl DerivedState for LusdInStabilityPool {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "lusd_in_stability_pool"
    }

    async fn read(&self, reader: &dyn LiquityReader, at: BlockTag) -> Result<Decimal, ChainError> {
        reader.get_lusd_in_stability_pool(at).await
    }
}

pub struct LusdBalance {
    pub owner: Address,
}

#[async_trait]
impl DerivedState for LusdBalance {
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "lusd_balance"
    }

    async fn read(&self, reader: &dyn LiquityReader, at: BlockTag) -> Result<Decimal, ChainError> {
        reader.get_lusd_balance(&self.owner, at).await
    }
}

/// Connects one watch's coalescer to its read and callback.
pub struct ReaderBridge<Q: DerivedState> {
    watch: WatchId,
    quantity: Arc<Q>,
    reader: Arc<dyn LiquityReader>,
    callback: StateCallback<Q::Output>,
    shutdown_rx: ShutdownReceiver,
}

impl<Q: DerivedState> ReaderBridge<Q> {
    pub fn new(
        watch: WatchId,
        quantity: Q,
        reader: Arc<dyn LiquityReader>,
        callback: StateCallback<Q::Output>,
        shutdown_rx: ShutdownReceiver,
    ) -> Self {
        Self {
            watch,
            quantity: Arc::new(quantity),
            reader,
            callback,
            shutdown_rx,
        }
    }

    /// Start one read pinned to `at` on the current runtime.
    ///
    /// Reads are not ordered against each other. A read that completes
    /// after the watch was disposed is dropped instead of delivered.
    pub fn trigger(&self, at: BlockTag) -> JoinHandle<()> {
        let watch = self.watch;
        let quantity = Arc::clone(&self.quantity);
        let reader = Arc::clone(&self.reader);
        let callback = Arc::clone(&self.callback);
        let shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let name = quantity.name();
            debug!(%watch, quantity = name, block = %at, "Reading derived state");

            let result = quantity.read(&*reader, at).await;

            if *shutdown_rx.borrow() {
                debug!(%watch, quantity = name, block = %at, "Dropping read completed after disposal");
                return;
            }
            if let Err(e) = &result {
                warn!(%watch, quantity = name, block = %at, error = %e, "Derived state read failed");
            }
            callback(result);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::shutdown_channel;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use trovewatch_sdk::memory::{MemoryLedger, ReadKind};
    use trovewatch_sdk::objects::ContractAddresses;

    fn ledger() -> Arc<MemoryLedger> {
        Arc::new(MemoryLedger::new(ContractAddresses {
            active_pool: Address::new("0x01"),
            default_pool: Address::new("0x02"),
            stability_pool: Address::new("0x03"),
            trove_manager: Address::new("0x04"),
            lusd_token: Address::new("0x05"),
        }))
    }

    fn bridge<Q: DerivedState>(
        ledger: &Arc<MemoryLedger>,
        quantity: Q,
    ) -> (
        ReaderBridge<Q>,
        crate::events::ShutdownSender,
        mpsc::UnboundedReceiver<Result<Q::Output, ChainError>>,
    ) {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: StateCallback<Q::Output> = Arc::new(move |result| {
            let _ = tx.send(result);
        });
        let bridge = ReaderBridge::new(
            WatchId::generate(),
            quantity,
            ledger.clone(),
            callback,
            shutdown_rx,
        );
        (bridge, shutdown_tx, rx)
    }

    #[tokio::test]
    async fn test_trigger_reads_once_at_requested_block() {
        let ledger = ledger();
        let owner = Address::new("0xa1");
        let (bridge, _shutdown_tx, mut rx) = bridge(
            &ledger,
            LusdBalance {
                owner: owner.clone(),
            },
        );

        bridge.trigger(BlockTag::Number(42)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), Ok(Decimal::ZERO));
        assert_eq!(
            ledger.reads(),
            vec![(ReadKind::LusdBalance(owner), BlockTag::Number(42))]
        );
    }

    #[tokio::test]
    async fn test_read_failure_reaches_callback() {
        let ledger = ledger();
        ledger.fail_reads(true);
        let (bridge, _shutdown_tx, mut rx) = bridge(&ledger, NumberOfTroves);

        bridge.trigger(BlockTag::Latest).await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            Err(ChainError::Read {
                operation: "number_of_troves",
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_completing_after_disposal_is_dropped() {
        let ledger = ledger();
        ledger.set_read_delay(Some(Duration::from_millis(100)));
        let (bridge, shutdown_tx, mut rx) = bridge(&ledger, Total);

        let read = bridge.trigger(BlockTag::Number(9));
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown_tx.send_replace(true);
        read.await.unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(ledger.reads().len(), 1);
    }
}
