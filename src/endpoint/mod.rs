//! The interchange adapter
//!
//! Presents an ordered chain of sources as one read/write endpoint. Reads
//! fall through the chain and backfill; writes propagate in the configured
//! [`WriteMode`]. All source operations that declare a queue key are
//! serialized through a single [`KeyQueue`].

mod error;
mod options;
mod read;
mod write;

pub use error::{InterchangeError, InterchangeResult};
pub use options::{InterchangeOptions, WriteMode};

use crate::queue::KeyQueue;
use crate::source::{Source, SourceChain};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A chain of sources behind a single `read` / `write` pair.
///
/// Chain and options are fixed at construction.
#[derive(Debug, Clone)]
pub struct Interchange {
    chain: SourceChain,
    queue: Arc<KeyQueue>,
    write_mode: WriteMode,
}

impl Interchange {
    /// Build an adapter over `sources` (primary first).
    ///
    /// Fails with a configuration error when `sources` is empty.
    pub fn build(sources: Vec<Source>, options: InterchangeOptions) -> InterchangeResult<Self> {
        let chain = SourceChain::new(sources)
            .ok_or_else(|| InterchangeError::configuration("a chain needs at least one source"))?;
        Ok(Self::with_chain(chain, options))
    }

    /// Build an adapter over an existing chain.
    pub fn with_chain(chain: SourceChain, options: InterchangeOptions) -> Self {
        let queue = options.queue.unwrap_or_default();
        Self {
            chain,
            queue,
            write_mode: options.write_mode,
        }
    }

    /// Read `id`: the first defined value in chain order, converted to the
    /// primary's representation. Sources before the hit are backfilled.
    ///
    /// Returns `Ok(None)` when no source has a value.
    pub async fn read(&self, id: &Value) -> InterchangeResult<Option<Value>> {
        debug!(%id, sources = self.chain.len(), "read");
        read::read_chain(&self.chain, &self.queue, id).await
    }

    /// Write `value` to every source according to the write mode.
    ///
    /// Returns the value as finally propagated to the primary source
    /// (series) or the input unchanged (parallel).
    pub async fn write(&self, value: Value) -> InterchangeResult<Value> {
        debug!(mode = %self.write_mode, sources = self.chain.len(), "write");
        match self.write_mode {
            WriteMode::Series => write::write_series(&self.chain, &self.queue, value).await,
            WriteMode::Parallel => write::write_parallel(&self.chain, &self.queue, value).await,
        }
    }

    pub fn sources(&self) -> &SourceChain {
        &self.chain
    }

    pub fn queue(&self) -> &Arc<KeyQueue> {
        &self.queue
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }
}
