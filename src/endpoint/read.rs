//! Read pipeline
//!
//! Forward leg: ask each source in order until one yields a value.
//! Backward leg: carry that value back up the chain, converting it into each
//! earlier source's representation and writing it into sources that missed.

use super::error::InterchangeError;
use super::write::{settle, spawn_write};
use crate::queue::KeyQueue;
use crate::source::{Conversion, ReadAction, ResultAction, Source, SourceChain};
use crate::traversal::{boomerang, Direction, Step, Visitor};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// State carried across the visits of one read.
struct ReadVisitor<'a> {
    id: &'a Value,
    queue: &'a KeyQueue,
    last_index: usize,
    /// Current logical value
    value: Option<Value>,
    /// Conversion pair of the most recently visited source that produced or
    /// received the value
    conversion: Option<Conversion>,
}

impl<'a> ReadVisitor<'a> {
    async fn forward(&mut self, source: &Source, index: usize) -> Result<Step, InterchangeError> {
        let Some(reader) = source.reader() else {
            return Ok(Step::Continue);
        };

        let key = source.read_key(self.id);
        let outcome = self
            .queue
            .run(key.as_deref(), || reader.read(self.id))
            .await;

        match outcome {
            Err(err) => match source.classify_read_error(&err) {
                ReadAction::Throw => Err(InterchangeError::Read { index, source: err }),
                ReadAction::Fallback if index == self.last_index => {
                    Err(InterchangeError::NoFallback { index, source: err })
                }
                ReadAction::Fallback => {
                    warn!(index, source = source.name(), error = %err, "read failed, falling back");
                    Ok(Step::Continue)
                }
            },
            Ok(None) => Ok(Step::Continue),
            Ok(Some(value)) => {
                if source.classify_read_result(&value) == ResultAction::Fallback {
                    debug!(index, source = source.name(), "read result rejected, falling back");
                    return Ok(Step::Continue);
                }
                debug!(index, source = source.name(), "read hit");
                self.value = Some(value);
                self.conversion = Some(source.conversion().clone());
                Ok(Step::StopAndReverse)
            }
        }
    }

    async fn backward(&mut self, source: &Source, index: usize) -> Result<(), InterchangeError> {
        let Some(value) = self.value.take() else {
            return Ok(());
        };
        let previous = self.conversion.replace(source.conversion().clone());
        let mut value = match previous {
            Some(conversion) => conversion.read(value),
            None => value,
        };

        if source.writes_missing_read() {
            if let Some(writer) = source.writer() {
                debug!(index, source = source.name(), "backfilling missed read");
                let key = source.write_key(&value);
                let task = spawn_write(self.queue, writer, key.as_deref(), value.clone()).await;
                let written = settle(index, task).await?;
                if let Some(written) = written {
                    value = written;
                }
            }
        }

        self.value = Some(value);
        Ok(())
    }
}

#[async_trait]
impl<'a> Visitor<Source> for ReadVisitor<'a> {
    type Error = InterchangeError;

    async fn visit(
        &mut self,
        source: &Source,
        index: usize,
        direction: Direction,
    ) -> Result<Step, InterchangeError> {
        match direction {
            Direction::Forward => self.forward(source, index).await,
            Direction::Backward => {
                self.backward(source, index).await?;
                Ok(Step::Continue)
            }
        }
    }
}

/// Find the first defined value for `id` and backfill the sources before it.
pub(crate) async fn read_chain(
    chain: &SourceChain,
    queue: &KeyQueue,
    id: &Value,
) -> Result<Option<Value>, InterchangeError> {
    let mut visitor = ReadVisitor {
        id,
        queue,
        last_index: chain.last_index(),
        value: None,
        conversion: None,
    };
    let traversal = boomerang(&chain[..], &mut visitor).await?;
    debug!(turned_at = ?traversal.turned_at, visits = traversal.visits, "read complete");
    Ok(visitor.value)
}
