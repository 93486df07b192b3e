//! Replaying scripted ledger events.

use crate::config::file::ScriptStep;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use trovewatch_sdk::memory::MemoryLedger;
use trovewatch_sdk::objects::LedgerEvent;

/// Emits script steps into a [`MemoryLedger`] at their configured pace.
pub struct ScriptRunner {
    ledger: Arc<MemoryLedger>,
    steps: Vec<ScriptStep>,
}

impl ScriptRunner {
    pub fn new(ledger: Arc<MemoryLedger>, steps: Vec<ScriptStep>) -> Self {
        Self { ledger, steps }
    }

    /// Emit every step, then wait `settle` for the last reads to land.
    pub async fn run(self, settle: Duration) {
        info!(steps = self.steps.len(), "Replaying script");

        for (index, step) in self.steps.into_iter().enumerate() {
            if step.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
            }
            let contract = self.ledger.contracts().emitter_of(&step.event).clone();
            debug!(index, block = ?step.block, event = %step.event.name(), "Emitting script step");
            self.ledger
                .emit(LedgerEvent::new(contract, step.block, step.event));
        }

        tokio::time::sleep(settle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::FileConfig;
    use trovewatch_core::config::ObserverConfig;
    use trovewatch_core::watch::LedgerObserver;
    use trovewatch_sdk::memory::ReadKind;
    use trovewatch_sdk::objects::{Address, BlockTag};

    const REPLAY: &str = r#"
[contracts]
active_pool = "0x01"
default_pool = "0x02"
stability_pool = "0x03"
trove_manager = "0x04"
lusd_token = "0x05"

[[script]]
block = 100
event = "trove_created"
borrower = "0xa1"

[[script]]
delay_ms = 10
block = 103
event = "trove_updated"
borrower = "0xa1"
debt = "2000"
collateral = "1"

[[script]]
delay_ms = 200
block = 110
event = "user_deposit_changed"
depositor = "0xa1"
deposit = "500"
"#;

    #[tokio::test(start_paused = true)]
    async fn test_replay_drives_watches() {
        let config: FileConfig = toml::from_str(REPLAY).unwrap();
        let ledger = Arc::new(MemoryLedger::new(config.contracts.clone()));
        let observer = LedgerObserver::new(
            ledger.clone(),
            config.contracts.clone(),
            ObserverConfig::default(),
        )
        .with_user_address(Address::new("0xa1"));

        let _trove = observer
            .watch_trove_without_rewards(|_| {}, None)
            .unwrap();
        let _deposit = observer.watch_stability_deposit(|_| {}, None).unwrap();

        ScriptRunner::new(ledger.clone(), config.script)
            .run(Duration::from_millis(100))
            .await;

        assert_eq!(
            ledger.reads(),
            vec![
                (
                    ReadKind::TroveWithoutRewards(Address::new("0xa1")),
                    BlockTag::Number(103)
                ),
                (
                    ReadKind::StabilityDeposit(Address::new("0xa1")),
                    BlockTag::Number(110)
                ),
            ]
        );
    }
}
