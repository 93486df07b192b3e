use serde::{Deserialize, Serialize};

/// Height of a block on the ledger.
pub type BlockNumber = u64;

/// Point in the ledger's history a read is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    /// The newest block the client knows about.
    #[default]
    Latest,
    /// A specific historical block.
    Number(BlockNumber),
}

impl From<Option<BlockNumber>> for BlockTag {
    fn from(value: Option<BlockNumber>) -> Self {
        value.map_or(BlockTag::Latest, BlockTag::Number)
    }
}

impl std::fmt::Display for BlockTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Number(n) => write!(f, "#{n}"),
        }
    }
}
