//! Asynchronous usage recording
//!
//! Usage entries flow through an unbounded channel to a drain task so the
//! response path never waits on the sink. Recording is best-effort: a full
//! or failed sink costs an audit row, never a request.

use crate::core::models::UsageLogEntry;
use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Destination for usage audit entries
#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn store(&self, entry: UsageLogEntry) -> Result<()>;
}

/// In-process sink keeping entries in memory, newest last
#[derive(Default)]
pub struct MemoryUsageSink {
    entries: RwLock<Vec<UsageLogEntry>>,
}

impl MemoryUsageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<UsageLogEntry> {
        let entries = self.entries.read();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Entries for one user, newest first
    pub fn for_user(&self, user_id: i64, limit: usize) -> Vec<UsageLogEntry> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|e| e.user_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl UsageSink for MemoryUsageSink {
    async fn store(&self, entry: UsageLogEntry) -> Result<()> {
        self.entries.write().push(entry);
        Ok(())
    }
}

/// Fire-and-forget front end over a [`UsageSink`]
#[derive(Clone)]
pub struct UsageRecorder {
    tx: mpsc::UnboundedSender<UsageLogEntry>,
}

impl UsageRecorder {
    /// Start the drain task and return the recorder handle
    pub fn spawn(sink: Arc<dyn UsageSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<UsageLogEntry>();

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = sink.store(entry).await {
                    warn!("Failed to store usage entry: {}", e);
                }
            }
            debug!("Usage drain task stopped");
        });

        Self { tx }
    }

    /// Queue one entry. Never blocks and never fails the caller.
    pub fn record(&self, entry: UsageLogEntry) {
        if self.tx.send(entry).is_err() {
            warn!("Usage drain task is gone, dropping entry");
        }
    }
}
