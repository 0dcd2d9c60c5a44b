#![allow(dead_code)]

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::U256;
use async_trait::async_trait;
use chain_monitor::net::{ChainClient, RpcError};
use chain_monitor::store::file::JsonFileStore;
use chain_monitor::store::{Store, StoreError};
use chain_monitor::{BlockHeader, BlockId, BlockRecord, BlockStore};

/// Deterministic header for `number`, chained to `number - 1`.
pub fn header(number: u64) -> BlockHeader {
    BlockHeader {
        number,
        hash: format!("0x{number:064x}"),
        parent_hash: format!("0x{:064x}", number.saturating_sub(1)),
        nonce: format!("0x{:016x}", number * 7),
        timestamp: 1_700_000_000 + number * 12,
        difficulty: U256::from(number) * U256::from(u64::MAX) * U256::from(u64::MAX),
        gas_limit: U256::from(30_000_000u64),
        gas_used: U256::from(number * 21_000),
        miner: "0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5".into(),
        transactions: (0..number % 3).map(|i| format!("0x{number:032x}{i:032x}")).collect(),
    }
}

/// Records for heights `from..=to`, as the monitor would store them.
pub fn records(from: u64, to: u64) -> BlockStore {
    (from..=to).map(|h| (h, BlockRecord::from(header(h)))).collect()
}

#[derive(Default)]
struct ChainState {
    head: u64,
    fail_latest: usize,
    fail_heights: Vec<u64>,
    fetched: Vec<u64>,
    latest_calls: usize,
}

/// Scripted chain: a movable tip plus one-shot failures.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// `Monitor`.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn at(head: u64) -> Self {
        let chain = MockChain::default();
        chain.set_head(head);
        chain
    }

    pub fn set_head(&self, head: u64) {
        self.state.lock().unwrap().head = head;
    }

    /// The next `n` tip queries fail.
    pub fn fail_latest(&self, n: usize) {
        self.state.lock().unwrap().fail_latest = n;
    }

    /// The next fetch of `height` fails.
    pub fn fail_once_at(&self, height: u64) {
        self.state.lock().unwrap().fail_heights.push(height);
    }

    /// Heights requested by number, in request order (failed attempts included).
    pub fn fetched(&self) -> Vec<u64> {
        self.state.lock().unwrap().fetched.clone()
    }

    pub fn latest_calls(&self) -> usize {
        self.state.lock().unwrap().latest_calls
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_block(&self, id: BlockId) -> Result<BlockHeader, RpcError> {
        let mut state = self.state.lock().unwrap();
        match id {
            BlockId::Latest => {
                state.latest_calls += 1;
                if state.fail_latest > 0 {
                    state.fail_latest -= 1;
                    return Err(RpcError::Client("connection refused".into()));
                }
                Ok(header(state.head))
            }
            BlockId::Number(height) => {
                state.fetched.push(height);
                if let Some(pos) = state.fail_heights.iter().position(|h| *h == height) {
                    state.fail_heights.remove(pos);
                    return Err(RpcError::Client("connection reset".into()));
                }
                if height > state.head {
                    return Err(RpcError::BlockNotFound(id));
                }
                Ok(header(height))
            }
        }
    }
}

/// File store whose saves can be made to fail.
pub struct FlakyStore {
    inner: JsonFileStore,
    failures: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new(path: &Path) -> (Self, Arc<AtomicUsize>) {
        let failures = Arc::new(AtomicUsize::new(0));
        let store = FlakyStore {
            inner: JsonFileStore::new(path).unwrap(),
            failures: failures.clone(),
        };
        (store, failures)
    }
}

impl Store for FlakyStore {
    fn load(&self) -> Result<Option<BlockStore>, StoreError> {
        self.inner.load()
    }

    fn save(&self, blocks: &BlockStore) -> Result<(), StoreError> {
        let pending = self.failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(blocks)
    }
}

/// Writes `blocks` to `path` the way a previous run would have.
pub fn seed(path: &Path, blocks: &BlockStore) {
    JsonFileStore::new(path).unwrap().save(blocks).unwrap();
}

pub fn saved(path: &Path) -> BlockStore {
    JsonFileStore::new(path).unwrap().load().unwrap().unwrap_or_default()
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's `tracing` output into the returned capture until the guard drops.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}
