//! Resumable block ingestion.
//!
//! A [`Monitor`] follows the chain tip: each cycle asks the client for the
//! latest height, fetches every block above the cursor one at a time in
//! ascending order, then rewrites the snapshot. Progress is durable only once
//! that rewrite succeeds; a restart resumes from whatever the snapshot holds.
use std::time::Duration;

use tracing::{error, info};

use crate::block::{BlockId, BlockRecord, BlockStore, last_processed};
use crate::error::MonitorError;
use crate::net::ChainClient;
use crate::store::Store;

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The tip was at or below the cursor.
    Idle { head: u64 },
    /// Blocks `from..=to` were recorded and saved.
    CaughtUp { from: u64, to: u64 },
}

pub struct Monitor<C, S> {
    client: C,
    store: S,
    blocks: BlockStore,
    cursor: u64,
    poll_interval: Duration,
}

impl<C: ChainClient, S: Store> Monitor<C, S> {
    /// Loads the saved history and positions the cursor.
    ///
    /// The cursor starts at the higher of the last saved height and the current
    /// tip, so nothing older than the tip at startup is ever fetched. A fresh
    /// deployment begins at the tip and a restart after downtime skips the
    /// blocks produced while it was down.
    pub async fn initialize(
        client: C,
        store: S,
        poll_interval: Duration,
    ) -> Result<Self, MonitorError> {
        let blocks = match store.load()? {
            Some(blocks) => {
                info!(
                    last_processed = last_processed(&blocks),
                    blocks = blocks.len(),
                    "Loaded existing data"
                );
                blocks
            }
            None => BlockStore::new(),
        };
        let saved = last_processed(&blocks);

        let head = client.latest_height().await?;
        let cursor = saved.max(head);
        info!(cursor, head, "Initialized, starting from block {cursor}");

        Ok(Monitor {
            client,
            store,
            blocks,
            cursor,
            poll_interval,
        })
    }

    /// Height of the last block covered by a successful save (or the starting tip).
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    /// Runs one poll/fetch/save cycle.
    ///
    /// On error the cursor is left untouched, so the next cycle re-fetches the
    /// same range. Blocks fetched before the failure stay in memory and are
    /// overwritten by the re-fetch.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        let head = self.client.latest_height().await?;
        if head <= self.cursor {
            return Ok(CycleOutcome::Idle { head });
        }

        let from = self.cursor + 1;
        info!(from, to = head, "New blocks found, processing blocks {from} to {head}");

        for height in from..=head {
            let header = self.client.get_block(BlockId::Number(height)).await?;
            self.blocks.insert(height, BlockRecord::from(header));
            info!(height, "Processed block {height}");
        }

        // Blocks this task for the full rewrite; the loop is the runtime's only task,
        // so nothing else is starved while it runs.
        self.store.save(&self.blocks)?;
        self.cursor = head;
        info!(blocks = self.blocks.len(), cursor = head, "Saved all blocks info");

        Ok(CycleOutcome::CaughtUp { from, to: head })
    }

    /// Polls forever, sleeping `poll_interval` after every cycle.
    ///
    /// Failed cycles are logged and retried after the same interval.
    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.run_cycle().await {
                error!(error = %e, cursor = self.cursor, "An error occurred");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
