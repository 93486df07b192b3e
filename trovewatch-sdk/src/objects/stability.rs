use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A depositor's position in the stability pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StabilityDeposit {
    /// LUSD deposited at the last deposit change.
    pub initial_lusd: Decimal,
    /// LUSD left after liquidations absorbed by the pool.
    pub current_lusd: Decimal,
    /// Collateral earned from liquidations and not yet withdrawn.
    pub collateral_gain: Decimal,
}

impl StabilityDeposit {
    pub fn new(deposit: Decimal) -> Self {
        Self {
            initial_lusd: deposit,
            current_lusd: deposit,
            collateral_gain: Decimal::ZERO,
        }
    }
}
