//! Typed ledger event records.
//!
//! Every notification pushed by a chain client is a [`LedgerEvent`]: the
//! emitting contract, the block it was mined in (when the client knows it),
//! and one strongly typed [`EventKind`] payload.

use super::{Address, BlockNumber};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies a class of events independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    EtherSent,
    TroveCreated,
    TroveUpdated,
    UserDepositChanged,
    Transfer,
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Payload of a ledger event.
///
/// Internally tagged on `event` so script files and logs can spell events
/// as flat records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// Ether moved out of a custody pool. Nothing is indexed.
    EtherSent { to: Address, amount: Decimal },
    /// A trove was opened. `borrower` is indexed.
    TroveCreated { borrower: Address },
    /// A trove's collateral or debt changed. `borrower` is indexed.
    TroveUpdated {
        borrower: Address,
        debt: Decimal,
        collateral: Decimal,
        #[serde(default)]
        stake: Decimal,
    },
    /// A stability deposit changed. `depositor` is indexed.
    UserDepositChanged { depositor: Address, deposit: Decimal },
    /// LUSD moved between accounts. `from` and `to` are indexed.
    Transfer {
        from: Address,
        to: Address,
        value: Decimal,
    },
}

impl EventKind {
    pub fn name(&self) -> EventName {
        match self {
            EventKind::EtherSent { .. } => EventName::EtherSent,
            EventKind::TroveCreated { .. } => EventName::TroveCreated,
            EventKind::TroveUpdated { .. } => EventName::TroveUpdated,
            EventKind::UserDepositChanged { .. } => EventName::UserDepositChanged,
            EventKind::Transfer { .. } => EventName::Transfer,
        }
    }

    /// Indexed parameters in declaration order; filters match against these.
    pub fn topics(&self) -> [Option<&Address>; 2] {
        match self {
            EventKind::EtherSent { .. } => [None, None],
            EventKind::TroveCreated { borrower } | EventKind::TroveUpdated { borrower, .. } => {
                [Some(borrower), None]
            }
            EventKind::UserDepositChanged { depositor, .. } => [Some(depositor), None],
            EventKind::Transfer { from, to, .. } => [Some(from), Some(to)],
        }
    }

    /// Destination of a value transfer, if this event moves value.
    pub fn recipient(&self) -> Option<&Address> {
        match self {
            EventKind::EtherSent { to, .. } | EventKind::Transfer { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Source of a value transfer, if the event names one.
    pub fn sender(&self) -> Option<&Address> {
        match self {
            EventKind::Transfer { from, .. } => Some(from),
            _ => None,
        }
    }
}

/// A single notification delivered by a chain client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Contract that emitted the event.
    pub contract: Address,
    /// Block the event was mined in. Pending or synthetic events may lack one.
    pub block_number: Option<BlockNumber>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl LedgerEvent {
    pub fn new(contract: Address, block_number: Option<BlockNumber>, kind: EventKind) -> Self {
        Self {
            contract,
            block_number,
            kind,
        }
    }

    pub fn name(&self) -> EventName {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_exposes_both_topics() {
        let kind = EventKind::Transfer {
            from: Address::new("0x01"),
            to: Address::new("0x02"),
            value: Decimal::ONE,
        };
        assert_eq!(
            kind.topics(),
            [Some(&Address::new("0x01")), Some(&Address::new("0x02"))]
        );
        assert_eq!(kind.recipient(), Some(&Address::new("0x02")));
        assert_eq!(kind.sender(), Some(&Address::new("0x01")));
    }

    #[test]
    fn test_event_parses_from_flat_record() {
        let event: LedgerEvent = serde_json::from_str(
            r#"{"contract":"0xAA","block_number":7,"event":"trove_updated","borrower":"0xBB","debt":"2000","collateral":"1.5"}"#,
        )
        .unwrap();
        assert_eq!(event.name(), EventName::TroveUpdated);
        assert_eq!(event.block_number, Some(7));
        assert_eq!(
            event.kind.topics(),
            [Some(&Address::new("0xbb")), None]
        );
    }
}
