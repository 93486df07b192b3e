use crate::objects::{Address, EventName, LedgerEvent};

/// Describes a class of events one contract emits, optionally narrowed by
/// its indexed parameters.
///
/// A `None` topic matches any value, mirroring how log filters treat
/// unspecified topics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventFilter {
    pub contract: Address,
    pub event: EventName,
    pub topics: [Option<Address>; 2],
}

impl EventFilter {
    pub fn new(contract: Address, event: EventName) -> Self {
        Self {
            contract,
            event,
            topics: [None, None],
        }
    }

    /// `EtherSent(to, amount)` on a custody pool. The recipient is not
    /// indexed, so narrowing it is left to the listener.
    pub fn ether_sent(pool: &Address) -> Self {
        Self::new(pool.clone(), EventName::EtherSent)
    }

    pub fn trove_created(trove_manager: &Address, borrower: Option<&Address>) -> Self {
        Self {
            topics: [borrower.cloned(), None],
            ..Self::new(trove_manager.clone(), EventName::TroveCreated)
        }
    }

    pub fn trove_updated(trove_manager: &Address, borrower: Option<&Address>) -> Self {
        Self {
            topics: [borrower.cloned(), None],
            ..Self::new(trove_manager.clone(), EventName::TroveUpdated)
        }
    }

    pub fn user_deposit_changed(stability_pool: &Address, depositor: Option<&Address>) -> Self {
        Self {
            topics: [depositor.cloned(), None],
            ..Self::new(stability_pool.clone(), EventName::UserDepositChanged)
        }
    }

    pub fn transfer(token: &Address, from: Option<&Address>, to: Option<&Address>) -> Self {
        Self {
            topics: [from.cloned(), to.cloned()],
            ..Self::new(token.clone(), EventName::Transfer)
        }
    }

    /// Whether `event` falls within this filter.
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        if event.contract != self.contract || event.name() != self.event {
            return false;
        }
        self.topics
            .iter()
            .zip(event.kind.topics())
            .all(|(expected, actual)| match expected {
                None => true,
                Some(expected) => actual == Some(expected),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Decimal, EventKind};

    fn token() -> Address {
        Address::new("0x70")
    }

    fn transfer(from: &str, to: &str) -> LedgerEvent {
        LedgerEvent::new(
            token(),
            Some(1),
            EventKind::Transfer {
                from: Address::new(from),
                to: Address::new(to),
                value: Decimal::TEN,
            },
        )
    }

    #[test]
    fn test_transfer_filter_matches_on_indexed_side_only() {
        let user = Address::new("0xa1");
        let outgoing = EventFilter::transfer(&token(), Some(&user), None);
        let incoming = EventFilter::transfer(&token(), None, Some(&user));

        assert!(outgoing.matches(&transfer("0xa1", "0xb2")));
        assert!(!outgoing.matches(&transfer("0xb2", "0xa1")));
        assert!(incoming.matches(&transfer("0xb2", "0xa1")));
        assert!(!incoming.matches(&transfer("0xa1", "0xb2")));
    }

    #[test]
    fn test_filter_rejects_other_contract_and_event() {
        let borrower = Address::new("0xa1");
        let filter = EventFilter::trove_updated(&Address::new("0x10"), Some(&borrower));

        let elsewhere = LedgerEvent::new(
            Address::new("0x11"),
            Some(1),
            EventKind::TroveUpdated {
                borrower: borrower.clone(),
                debt: Decimal::ONE,
                collateral: Decimal::ONE,
                stake: Decimal::ONE,
            },
        );
        let created = LedgerEvent::new(
            Address::new("0x10"),
            Some(1),
            EventKind::TroveCreated { borrower },
        );

        assert!(!filter.matches(&elsewhere));
        assert!(!filter.matches(&created));
    }

    #[test]
    fn test_unindexed_filter_matches_any_subject() {
        let filter = EventFilter::trove_updated(&Address::new("0x10"), None);
        let event = LedgerEvent::new(
            Address::new("0x10"),
            None,
            EventKind::TroveUpdated {
                borrower: Address::new("0xfe"),
                debt: Decimal::ZERO,
                collateral: Decimal::ZERO,
                stake: Decimal::ZERO,
            },
        );
        assert!(filter.matches(&event));
    }
}
