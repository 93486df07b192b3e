use crate::objects::{
    Address, ContractAddresses, Decimal, EventKind, StabilityDeposit, Trove,
    TroveWithPendingRewards,
};
use std::collections::BTreeMap;

/// Protocol state as of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub price: Decimal,
    pub troves: BTreeMap<Address, TroveWithPendingRewards>,
    pub total_redistributed: Trove,
    pub deposits: BTreeMap<Address, StabilityDeposit>,
    pub lusd_balances: BTreeMap<Address, Decimal>,
}

impl LedgerState {
    /// Aggregate of every open trove.
    pub fn total(&self) -> Trove {
        self.troves.values().map(TroveWithPendingRewards::trove).sum()
    }

    pub fn lusd_balance(&self, owner: &Address) -> Decimal {
        self.lusd_balances.get(owner).copied().unwrap_or_default()
    }

    /// Fold the effect of one event into the state.
    pub fn apply(&mut self, contracts: &ContractAddresses, kind: &EventKind) {
        match kind {
            EventKind::TroveCreated { borrower } => {
                let snapshot = self.total_redistributed;
                self.troves
                    .entry(borrower.clone())
                    .or_insert_with(|| TroveWithPendingRewards {
                        snapshot_of_total_redistributed: snapshot,
                        ..Default::default()
                    });
            }
            EventKind::TroveUpdated {
                borrower,
                debt,
                collateral,
                stake,
            } => {
                if debt.is_zero() && collateral.is_zero() {
                    self.troves.remove(borrower);
                } else {
                    self.troves.insert(
                        borrower.clone(),
                        TroveWithPendingRewards {
                            collateral: *collateral,
                            debt: *debt,
                            stake: *stake,
                            snapshot_of_total_redistributed: self.total_redistributed,
                        },
                    );
                }
            }
            EventKind::UserDepositChanged { depositor, deposit } => {
                // A deposit change withdraws accumulated gains.
                if deposit.is_zero() {
                    self.deposits.remove(depositor);
                } else {
                    self.deposits
                        .insert(depositor.clone(), StabilityDeposit::new(*deposit));
                }
            }
            EventKind::Transfer { from, to, value } => {
                if !from.is_zero() {
                    let balance = self.lusd_balances.entry(from.clone()).or_default();
                    *balance -= *value;
                }
                if !to.is_zero() {
                    *self.lusd_balances.entry(to.clone()).or_default() += *value;
                }
            }
            EventKind::EtherSent { to, amount } => {
                if *to == contracts.default_pool {
                    self.total_redistributed.collateral += *amount;
                } else if *to == contracts.stability_pool {
                    self.distribute_gain(*amount);
                }
            }
        }
    }

    fn distribute_gain(&mut self, amount: Decimal) {
        let pooled: Decimal = self.deposits.values().map(|d| d.current_lusd).sum();
        if pooled.is_zero() {
            return;
        }
        for deposit in self.deposits.values_mut() {
            deposit.collateral_gain += amount * deposit.current_lusd / pooled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contracts() -> ContractAddresses {
        ContractAddresses {
            active_pool: Address::new("0x01"),
            default_pool: Address::new("0x02"),
            stability_pool: Address::new("0x03"),
            trove_manager: Address::new("0x04"),
            lusd_token: Address::new("0x05"),
        }
    }

    #[test]
    fn test_trove_update_with_zero_debt_closes_trove() {
        let contracts = contracts();
        let borrower = Address::new("0xa1");
        let mut state = LedgerState::default();

        state.apply(
            &contracts,
            &EventKind::TroveUpdated {
                borrower: borrower.clone(),
                debt: Decimal::from(2000),
                collateral: Decimal::from(2),
                stake: Decimal::from(2),
            },
        );
        assert_eq!(state.total(), Trove::new(Decimal::from(2), Decimal::from(2000)));

        state.apply(
            &contracts,
            &EventKind::TroveUpdated {
                borrower,
                debt: Decimal::ZERO,
                collateral: Decimal::ZERO,
                stake: Decimal::ZERO,
            },
        );
        assert!(state.troves.is_empty());
    }

    #[test]
    fn test_ether_sent_to_stability_pool_is_shared_pro_rata() {
        let contracts = contracts();
        let mut state = LedgerState::default();
        for (who, amount) in [("0xa1", 300), ("0xa2", 100)] {
            state.apply(
                &contracts,
                &EventKind::UserDepositChanged {
                    depositor: Address::new(who),
                    deposit: Decimal::from(amount),
                },
            );
        }

        state.apply(
            &contracts,
            &EventKind::EtherSent {
                to: contracts.stability_pool.clone(),
                amount: Decimal::from(4),
            },
        );

        assert_eq!(
            state.deposits[&Address::new("0xa1")].collateral_gain,
            Decimal::from(3)
        );
        assert_eq!(
            state.deposits[&Address::new("0xa2")].collateral_gain,
            Decimal::from(1)
        );
    }

    #[test]
    fn test_ether_sent_to_default_pool_is_redistributed() {
        let contracts = contracts();
        let mut state = LedgerState::default();
        state.apply(
            &contracts,
            &EventKind::EtherSent {
                to: contracts.default_pool.clone(),
                amount: Decimal::from(5),
            },
        );
        assert_eq!(state.total_redistributed.collateral, Decimal::from(5));
    }

    #[test]
    fn test_transfer_moves_balance_and_mints_from_zero() {
        let contracts = contracts();
        let user = Address::new("0xa1");
        let mut state = LedgerState::default();
        state.apply(
            &contracts,
            &EventKind::Transfer {
                from: Address::zero(),
                to: user.clone(),
                value: Decimal::from(100),
            },
        );
        state.apply(
            &contracts,
            &EventKind::Transfer {
                from: user.clone(),
                to: contracts.stability_pool.clone(),
                value: Decimal::from(40),
            },
        );
        assert_eq!(state.lusd_balance(&user), Decimal::from(60));
        assert_eq!(state.lusd_balance(&contracts.stability_pool), Decimal::from(40));
    }
}
