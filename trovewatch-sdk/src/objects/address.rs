use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A ledger account or contract address.
///
/// Addresses compare case-insensitively, so the hex string is lowercased
/// once on construction and compared byte-wise afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "CompactString", into = "CompactString")]
pub struct Address(CompactString);

impl Address {
    /// The all-zero address, used as the sender of minted tokens.
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut inner = CompactString::from(raw.as_ref());
        inner.make_ascii_lowercase();
        Self(inner)
    }

    pub fn zero() -> Self {
        Self::new(Self::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Self::ZERO
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<CompactString> for Address {
    fn from(value: CompactString) -> Self {
        Self::new(value)
    }
}

impl From<Address> for CompactString {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_compare_case_insensitively() {
        let upper = Address::new("0xABCDEF0000000000000000000000000000000001");
        let lower = Address::new("0xabcdef0000000000000000000000000000000001");
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let address: Address =
            serde_json::from_str("\"0xAAaa000000000000000000000000000000000000\"").unwrap();
        assert_eq!(address, Address::new("0xaaaa000000000000000000000000000000000000"));
        assert!(!address.is_zero());
        assert!(Address::zero().is_zero());
    }
}
