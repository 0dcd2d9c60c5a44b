//! Block types shared by the chain client, the ingestion loop and the file store.
use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// History of ingested blocks keyed by height.
///
/// Ordered so the persisted snapshot reads top to bottom by height; the order
/// itself carries no meaning.
pub type BlockStore = BTreeMap<u64, BlockRecord>;

/// Identifies a block to fetch from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Latest,
    Number(u64),
}

impl BlockId {
    /// JSON-RPC block tag: `"latest"` or a `0x`-prefixed hex quantity.
    pub fn to_rpc_tag(self) -> String {
        match self {
            BlockId::Latest => "latest".to_string(),
            BlockId::Number(n) => format!("0x{n:x}"),
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Latest => write!(f, "latest"),
            BlockId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Block metadata as reported by the chain client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub difficulty: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub miner: String,
    /// Transaction hashes in block order.
    pub transactions: Vec<String>,
}

/// Persisted summary of a single block.
///
/// Wide integers are kept as decimal strings so nothing is lost when the
/// snapshot is read by tools with narrower numeric types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub timestamp: u64,
    pub difficulty: String,
    pub gas_limit: String,
    pub gas_consumed: String,
    pub miner: String,
    pub transactions: Vec<String>,
}

impl From<BlockHeader> for BlockRecord {
    fn from(header: BlockHeader) -> Self {
        BlockRecord {
            number: header.number,
            hash: header.hash,
            parent_hash: header.parent_hash,
            nonce: header.nonce,
            timestamp: header.timestamp,
            difficulty: header.difficulty.to_string(),
            gas_limit: header.gas_limit.to_string(),
            gas_consumed: header.gas_used.to_string(),
            miner: header.miner,
            transactions: header.transactions,
        }
    }
}

/// Highest recorded height, or `0` for an empty store.
pub fn last_processed(blocks: &BlockStore) -> u64 {
    blocks.last_key_value().map(|(h, _)| *h).unwrap_or(0)
}
