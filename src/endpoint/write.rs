//! Write pipeline
//!
//! Parallel mode fans one unconverted value out to every writer. Series mode
//! precomputes each source's representation top-down, then writes bottom-up
//! so that what a store actually persisted flows into the sources above it.

use super::error::InterchangeError;
use crate::queue::KeyQueue;
use crate::source::{SourceChain, SourceResult, Writer};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Claim the write's place in its lane, then start it on its own task.
///
/// The lane position is taken before this returns, so later operations on
/// the same key queue behind it. Dropping the handle leaves the write running.
pub(crate) async fn spawn_write(
    queue: &KeyQueue,
    writer: &Arc<dyn Writer>,
    key: Option<&str>,
    value: Value,
) -> JoinHandle<SourceResult> {
    let ticket = queue.ticket(key).await;
    let writer = writer.clone();
    tokio::spawn(async move { ticket.run(|| writer.write(value)).await })
}

/// Launch a write nobody waits for. Failures are only logged.
async fn detach_write(
    queue: &KeyQueue,
    writer: &Arc<dyn Writer>,
    key: Option<&str>,
    value: Value,
    index: usize,
    name: &str,
) {
    let task = spawn_write(queue, writer, key, value).await;
    let name = name.to_string();
    tokio::spawn(async move {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!(index, source = %name, error = %err, "detached write failed"),
            Err(join) => warn!(index, source = %name, error = %join, "detached write panicked"),
        }
    });
}

/// Wait for a spawned write and attribute any failure to `index`.
pub(crate) async fn settle(
    index: usize,
    task: JoinHandle<SourceResult>,
) -> Result<Option<Value>, InterchangeError> {
    match task.await {
        Ok(result) => result.map_err(|err| InterchangeError::Write { index, source: err }),
        Err(join) => Err(InterchangeError::Task(join.to_string())),
    }
}

/// Write `value` unconverted to every writer at once.
pub(crate) async fn write_parallel(
    chain: &SourceChain,
    queue: &Arc<KeyQueue>,
    value: Value,
) -> Result<Value, InterchangeError> {
    let mut pending = Vec::new();

    for (index, source) in chain.iter().enumerate() {
        let Some(writer) = source.writer() else {
            continue;
        };
        let key = source.write_key(&value);
        if !source.waits_for_write() {
            debug!(index, source = source.name(), "parallel write (detached)");
            detach_write(queue, writer, key.as_deref(), value.clone(), index, source.name()).await;
            continue;
        }
        debug!(index, source = source.name(), "parallel write");
        let task = spawn_write(queue, writer, key.as_deref(), value.clone()).await;
        pending.push((index, task));
    }

    // Let every awaited write settle before reporting the first failure.
    let mut failure = None;
    for (index, task) in pending {
        if let Err(err) = settle(index, task).await {
            warn!(error = %err, "parallel write failed");
            failure.get_or_insert(err);
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// Representation of `value` at every index, assuming each write stores
/// exactly what it is given.
fn precompute(chain: &SourceChain, value: Value) -> Vec<Value> {
    let mut representations = Vec::with_capacity(chain.len());
    representations.push(value);
    for source in chain.iter().skip(1) {
        let previous = representations[representations.len() - 1].clone();
        representations.push(source.conversion().write(previous));
    }
    representations
}

/// Convert top-down, then write from the last source back to the primary.
pub(crate) async fn write_series(
    chain: &SourceChain,
    queue: &Arc<KeyQueue>,
    value: Value,
) -> Result<Value, InterchangeError> {
    let representations = precompute(chain, value);
    let mut running = representations[chain.last_index()].clone();

    for (index, source) in chain.iter().enumerate().rev() {
        if let Some(writer) = source.writer() {
            let key = source.write_key(&running);
            if !source.waits_for_write() {
                debug!(index, source = source.name(), "series write (detached)");
                detach_write(queue, writer, key.as_deref(), running.clone(), index, source.name())
                    .await;
                if index > 0 {
                    running = representations[index - 1].clone();
                }
                continue;
            }

            debug!(index, source = source.name(), "series write");
            let task = spawn_write(queue, writer, key.as_deref(), running.clone()).await;
            let written = settle(index, task).await?;
            if let Some(written) = written {
                running = written;
            }
        }

        if index > 0 {
            running = source.conversion().read(running);
        }
    }

    Ok(running)
}
