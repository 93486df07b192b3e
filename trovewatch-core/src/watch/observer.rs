//! One watch operation per derived quantity.

use crate::config::ObserverConfig;
use crate::events::EventPredicate;
use crate::watch::bridge::{
    LusdBalance, LusdInStabilityPool, NumberOfTroves, StabilityDepositOf, Total,
    TotalRedistributed, TroveWithoutRewards,
};
use crate::watch::error::WatchError;
use crate::watch::handle::WatchHandle;
use crate::watch::registry::{Registry, Route};
use smallvec::smallvec;
use std::sync::Arc;
use trovewatch_sdk::chain::{ChainError, EventFilter, EventSource, LiquityReader};
use trovewatch_sdk::objects::{
    Address, ContractAddresses, Decimal, StabilityDeposit, Trove, TroveWithPendingRewards,
};

/// Keeps application state in sync with the ledger by watching events.
///
/// Every `watch_*` method registers its listeners before returning and
/// hands back a [`WatchHandle`]. Methods scoped to an account take an
/// optional address and fall back to the bound user address.
pub struct LedgerObserver {
    contracts: ContractAddresses,
    user_address: Option<Address>,
    registry: Registry,
}

impl LedgerObserver {
    /// Create an observer over a client implementing both sides of the seam.
    pub fn new<C>(client: Arc<C>, contracts: ContractAddresses, config: ObserverConfig) -> Self
    where
        C: EventSource + LiquityReader + 'static,
    {
        let events: Arc<dyn EventSource> = client.clone();
        let reader: Arc<dyn LiquityReader> = client;
        Self::from_parts(events, reader, contracts, config)
    }

    pub fn from_parts(
        events: Arc<dyn EventSource>,
        reader: Arc<dyn LiquityReader>,
        contracts: ContractAddresses,
        config: ObserverConfig,
    ) -> Self {
        Self {
            contracts,
            user_address: None,
            registry: Registry::new(events, reader, config.debounce_window),
        }
    }

    pub fn with_user_address(mut self, address: Address) -> Self {
        self.user_address = Some(address);
        self
    }

    /// Bind or unbind the active account. Existing watches keep the address
    /// they were registered with.
    pub fn set_user_address(&mut self, address: Option<Address>) {
        self.user_address = address;
    }

    pub fn user_address(&self) -> Option<&Address> {
        self.user_address.as_ref()
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    fn require_address(&self, explicit: Option<Address>) -> Result<Address, WatchError> {
        explicit
            .or_else(|| self.user_address.clone())
            .ok_or(WatchError::NoActiveAccount)
    }

    /// Watch the collateral and debt redistributed from liquidations.
    ///
    /// Redistribution shows up as ether sent from the active pool to the
    /// default pool; the recipient is not indexed, so it is checked per event.
    pub fn watch_total_redistributed<F>(&self, on_changed: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<Trove, ChainError>) + Send + Sync + 'static,
    {
        let routes = smallvec![
            Route::new(EventFilter::ether_sent(&self.contracts.active_pool)).when(
                EventPredicate::RecipientIs(self.contracts.default_pool.clone())
            ),
        ];
        self.registry
            .register(TotalRedistributed, routes, Arc::new(on_changed))
    }

    /// Watch one trove, without pending redistribution rewards applied.
    pub fn watch_trove_without_rewards<F>(
        &self,
        on_changed: F,
        address: Option<Address>,
    ) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<TroveWithPendingRewards, ChainError>) + Send + Sync + 'static,
    {
        let owner = self.require_address(address)?;
        let trove_manager = &self.contracts.trove_manager;
        let routes = smallvec![
            Route::new(EventFilter::trove_created(trove_manager, Some(&owner))),
            Route::new(EventFilter::trove_updated(trove_manager, Some(&owner))),
        ];
        self.registry
            .register(TroveWithoutRewards { owner }, routes, Arc::new(on_changed))
    }

    pub fn watch_number_of_troves<F>(&self, on_changed: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<u64, ChainError>) + Send + Sync + 'static,
    {
        let routes = smallvec![Route::new(EventFilter::trove_updated(
            &self.contracts.trove_manager,
            None
        ))];
        self.registry
            .register(NumberOfTroves, routes, Arc::new(on_changed))
    }

    /// Always fails: the price feed emits no event this observer can listen
    /// to. Poll [`LiquityReader::get_price`] instead.
    pub fn watch_price<F>(&self, _on_changed: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<Decimal, ChainError>) + Send + Sync + 'static,
    {
        Err(WatchError::NotImplemented("watch_price"))
    }

    /// Watch the aggregate collateral and debt of all troves.
    pub fn watch_total<F>(&self, on_changed: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<Trove, ChainError>) + Send + Sync + 'static,
    {
        let routes = smallvec![Route::new(EventFilter::trove_updated(
            &self.contracts.trove_manager,
            None
        ))];
        self.registry.register(Total, routes, Arc::new(on_changed))
    }

    /// Watch a stability deposit.
    ///
    /// Besides deposit changes, ether sent from the active pool to the
    /// stability pool means a liquidation was absorbed and the deposit may
    /// have new collateral gains.
    pub fn watch_stability_deposit<F>(
        &self,
        on_changed: F,
        address: Option<Address>,
    ) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<StabilityDeposit, ChainError>) + Send + Sync + 'static,
    {
        let depositor = self.require_address(address)?;
        let routes = smallvec![
            Route::new(EventFilter::user_deposit_changed(
                &self.contracts.stability_pool,
                Some(&depositor)
            )),
            Route::new(EventFilter::ether_sent(&self.contracts.active_pool)).when(
                EventPredicate::RecipientIs(self.contracts.stability_pool.clone())
            ),
        ];
        self.registry.register(
            StabilityDepositOf { depositor },
            routes,
            Arc::new(on_changed),
        )
    }

    /// Watch the LUSD held by the stability pool.
    pub fn watch_lusd_in_stability_pool<F>(&self, on_changed: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<Decimal, ChainError>) + Send + Sync + 'static,
    {
        let token = &self.contracts.lusd_token;
        let pool = &self.contracts.stability_pool;
        let routes = smallvec![
            Route::new(EventFilter::transfer(token, Some(pool), None)),
            Route::new(EventFilter::transfer(token, None, Some(pool))),
        ];
        self.registry
            .register(LusdInStabilityPool, routes, Arc::new(on_changed))
    }

    /// Watch an account's LUSD balance.
    pub fn watch_lusd_balance<F>(
        &self,
        on_changed: F,
        address: Option<Address>,
    ) -> Result<WatchHandle, WatchError>
    where
        F: Fn(Result<Decimal, ChainError>) + Send + Sync + 'static,
    {
        let owner = self.require_address(address)?;
        let token = &self.contracts.lusd_token;
        let routes = smallvec![
            Route::new(EventFilter::transfer(token, Some(&owner), None)),
            Route::new(EventFilter::transfer(token, None, Some(&owner))),
        ];
        self.registry
            .register(LusdBalance { owner }, routes, Arc::new(on_changed))
    }
}
