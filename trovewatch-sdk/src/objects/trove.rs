use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Collateral and debt of a trove, or an aggregate of many troves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trove {
    pub collateral: Decimal,
    pub debt: Decimal,
}

impl Trove {
    pub fn new(collateral: Decimal, debt: Decimal) -> Self {
        Self { collateral, debt }
    }

    pub fn is_empty(&self) -> bool {
        self.collateral.is_zero() && self.debt.is_zero()
    }
}

impl std::ops::Add for Trove {
    type Output = Trove;

    fn add(self, rhs: Trove) -> Trove {
        Trove {
            collateral: self.collateral + rhs.collateral,
            debt: self.debt + rhs.debt,
        }
    }
}

impl std::iter::Sum for Trove {
    fn sum<I: Iterator<Item = Trove>>(iter: I) -> Trove {
        iter.fold(Trove::default(), |acc, trove| acc + trove)
    }
}

/// A trove as stored on-chain, before pending redistribution rewards are applied.
///
/// `snapshot_of_total_redistributed` records the redistribution totals at the
/// trove's last update, which is what pending rewards are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TroveWithPendingRewards {
    pub collateral: Decimal,
    pub debt: Decimal,
    pub stake: Decimal,
    pub snapshot_of_total_redistributed: Trove,
}

impl TroveWithPendingRewards {
    /// Collateral and debt without the reward bookkeeping.
    pub fn trove(&self) -> Trove {
        Trove::new(self.collateral, self.debt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_troves_sum_component_wise() {
        let troves = [
            Trove::new(Decimal::from(2), Decimal::from(1000)),
            Trove::new(Decimal::from(3), Decimal::from(500)),
        ];
        let total: Trove = troves.into_iter().sum();
        assert_eq!(total, Trove::new(Decimal::from(5), Decimal::from(1500)));
        assert!(Trove::default().is_empty());
    }
}
