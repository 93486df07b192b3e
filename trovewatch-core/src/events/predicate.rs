//! Runtime conditions for events a filter cannot express.

use trovewatch_sdk::objects::{Address, LedgerEvent};

/// A condition evaluated against an event after its filter matched.
///
/// Used where the interesting parameter is not indexed, such as the
/// recipient of `EtherSent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPredicate {
    /// The event moves value to this address.
    RecipientIs(Address),
    /// The event moves value from this address.
    SenderIs(Address),
    /// Every inner predicate holds.
    All(Vec<EventPredicate>),
    /// At least one inner predicate holds.
    Any(Vec<EventPredicate>),
}

impl EventPredicate {
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        match self {
            EventPredicate::RecipientIs(address) => event.kind.recipient() == Some(address),
            EventPredicate::SenderIs(address) => event.kind.sender() == Some(address),
            EventPredicate::All(inner) => inner.iter().all(|p| p.matches(event)),
            EventPredicate::Any(inner) => inner.iter().any(|p| p.matches(event)),
        }
    }

    pub fn and(self, other: EventPredicate) -> EventPredicate {
        match self {
            EventPredicate::All(mut inner) => {
                inner.push(other);
                EventPredicate::All(inner)
            }
            first => EventPredicate::All(vec![first, other]),
        }
    }

    pub fn or(self, other: EventPredicate) -> EventPredicate {
        match self {
            EventPredicate::Any(mut inner) => {
                inner.push(other);
                EventPredicate::Any(inner)
            }
            first => EventPredicate::Any(vec![first, other]),
        }
    }
}
