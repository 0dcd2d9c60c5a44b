//! Chain access used by the ingestion loop.
use async_trait::async_trait;

use crate::block::{BlockHeader, BlockId};

pub mod rpc;

pub use rpc::{RpcClient, RpcError};

/// Source of block headers.
///
/// [`RpcClient`] talks to a real node; tests substitute a scripted chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetches the block identified by `id`.
    ///
    /// Returns [`RpcError::BlockNotFound`] when the node has no such block.
    async fn get_block(&self, id: BlockId) -> Result<BlockHeader, RpcError>;

    /// Height of the current chain tip.
    async fn latest_height(&self) -> Result<u64, RpcError> {
        Ok(self.get_block(BlockId::Latest).await?.number)
    }
}
