use super::{Address, EventKind};
use serde::{Deserialize, Serialize};

/// Addresses of the deployed contracts a watch may listen to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub active_pool: Address,
    pub default_pool: Address,
    pub stability_pool: Address,
    pub trove_manager: Address,
    pub lusd_token: Address,
}

impl ContractAddresses {
    /// The contract that emits events of this kind.
    pub fn emitter_of(&self, kind: &EventKind) -> &Address {
        match kind {
            EventKind::EtherSent { .. } => &self.active_pool,
            EventKind::TroveCreated { .. } | EventKind::TroveUpdated { .. } => &self.trove_manager,
            EventKind::UserDepositChanged { .. } => &self.stability_pool,
            EventKind::Transfer { .. } => &self.lusd_token,
        }
    }
}
