pub mod address;
pub mod block;
pub mod contracts;
pub mod events;
pub mod stability;
pub mod trove;

pub use address::Address;
pub use block::{BlockNumber, BlockTag};
pub use contracts::ContractAddresses;
pub use events::{EventKind, EventName, LedgerEvent};
pub use stability::StabilityDeposit;
pub use trove::{Trove, TroveWithPendingRewards};

/// Arbitrary-precision decimal used for every on-chain amount.
pub use rust_decimal::Decimal;
