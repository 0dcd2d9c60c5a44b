use thiserror::Error;

use crate::net::RpcError;
use crate::store::StoreError;

/// Errors surfaced by the ingestion loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("network error: {0}")]
    Network(#[from] RpcError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MonitorError {
    /// Returns `true` for corrupted persisted state, which no retry can fix.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::Store(StoreError::Parse { .. }))
    }
}
