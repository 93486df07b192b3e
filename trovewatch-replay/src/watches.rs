//! Registering the configured watches.

use crate::config::file::{WatchEntry, WatchKind};
use crate::output::printer;
use trovewatch_core::watch::{LedgerObserver, WatchError, WatchHandle};

/// Register one configured watch, printing every state it delivers.
pub fn register(observer: &LedgerObserver, entry: &WatchEntry) -> Result<WatchHandle, WatchError> {
    let address = entry.address.clone();
    match entry.kind {
        WatchKind::TotalRedistributed => {
            observer.watch_total_redistributed(printer("total_redistributed"))
        }
        WatchKind::Trove => {
            observer.watch_trove_without_rewards(printer("trove"), address)
        }
        WatchKind::NumberOfTroves => observer.watch_number_of_troves(printer("number_of_troves")),
        WatchKind::Price => observer.watch_price(printer("price")),
        WatchKind::Total => observer.watch_total(printer("total")),
        WatchKind::StabilityDeposit => {
            observer.watch_stability_deposit(printer("stability_deposit"), address)
        }
        WatchKind::LusdInStabilityPool => {
            observer.watch_lusd_in_stability_pool(printer("lusd_in_stability_pool"))
        }
        WatchKind::LusdBalance => observer.watch_lusd_balance(printer("lusd_balance"), address),
    }
}
