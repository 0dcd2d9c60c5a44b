//! Follows a JSON-RPC node and keeps a local JSON record of block headers and
//! transaction hashes, resuming from the saved history on restart.
pub mod block;
pub mod config;
pub mod error;
pub mod net;
pub mod store;
pub mod sync;

pub use block::{BlockHeader, BlockId, BlockRecord, BlockStore};
pub use error::MonitorError;
pub use sync::{CycleOutcome, Monitor};
