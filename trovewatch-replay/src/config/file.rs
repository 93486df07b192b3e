//! TOML file configuration structures.
//!
//! These structs directly map to the replay file format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trovewatch_sdk::objects::{Address, BlockNumber, ContractAddresses, EventKind};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub observer: ObserverConfig,
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub watches: Vec<WatchEntry>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// Observer configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    50
}

/// The account bound to the observer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Used by account-scoped watches that do not name their own address.
    #[serde(default)]
    pub address: Option<Address>,
}

/// Initial ledger state and replay pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Spot price at genesis.
    #[serde(default)]
    pub initial_price: Decimal,
    /// How long to keep watching after the last script step, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_price: Decimal::ZERO,
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_settle_ms() -> u64 {
    500
}

/// Derived quantities that can be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchKind {
    TotalRedistributed,
    Trove,
    NumberOfTroves,
    Price,
    Total,
    StabilityDeposit,
    LusdInStabilityPool,
    LusdBalance,
}

impl WatchKind {
    /// Whether the watch is scoped to an account address.
    pub fn is_account_scoped(&self) -> bool {
        matches!(
            self,
            WatchKind::Trove | WatchKind::StabilityDeposit | WatchKind::LusdBalance
        )
    }
}

/// One watch to register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    pub kind: WatchKind,
    /// Account to watch, overriding `[account]`.
    #[serde(default)]
    pub address: Option<Address>,
}

/// One ledger event to emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Pause before emitting, in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
    /// Block the event is mined in; omitted for events without one.
    #[serde(default)]
    pub block: Option<BlockNumber>,
    #[serde(flatten)]
    pub event: EventKind,
}
