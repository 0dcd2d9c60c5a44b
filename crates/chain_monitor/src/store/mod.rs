//! Durable snapshot of the block history.
//!
//! The whole [`BlockStore`] is written on every save and read back in one go on
//! startup; there is no incremental format.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::block::BlockStore;

pub mod file;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed block data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode block data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait Store {
    /// Reads the last saved snapshot.
    ///
    /// `None` when nothing has been saved yet; a snapshot that exists but is
    /// blank loads as an empty store.
    fn load(&self) -> Result<Option<BlockStore>, StoreError>;
    /// Replaces the saved snapshot with `blocks`.
    fn save(&self, blocks: &BlockStore) -> Result<(), StoreError>;
}
