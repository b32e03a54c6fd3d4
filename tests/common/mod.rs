//! Common test utilities for interchange integration tests
//!
//! Sources here record every call into a shared log so tests can assert on
//! which source saw which value, and in what order.

#![allow(dead_code)]

use async_trait::async_trait;
use interchange::{Reader, SourceResult, Writer};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One observed source operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read(usize, Value),
    Write(usize, Value),
}

/// Shared, ordered log of source calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Indexes that were read, in call order.
    pub fn reads(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Read(index, _) => Some(index),
                Call::Write(..) => None,
            })
            .collect()
    }

    /// `(index, value)` of every write, in call order.
    pub fn writes(&self) -> Vec<(usize, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(index, value) => Some((index, value)),
                Call::Read(..) => None,
            })
            .collect()
    }

    pub fn write_order(&self) -> Vec<usize> {
        self.writes().into_iter().map(|(index, _)| index).collect()
    }

    pub fn writes_to(&self, index: usize) -> Vec<Value> {
        self.writes()
            .into_iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn reader(&self, index: usize, result: Option<Value>) -> RecordingReader {
        RecordingReader {
            index,
            result: Ok(result),
            log: self.clone(),
        }
    }

    pub fn failing_reader(&self, index: usize, message: &str) -> RecordingReader {
        RecordingReader {
            index,
            result: Err(message.to_string()),
            log: self.clone(),
        }
    }

    /// Writer that records the value and returns `result`.
    pub fn writer(&self, index: usize, result: Option<Value>) -> RecordingWriter {
        RecordingWriter {
            index,
            result: Ok(result),
            gate: None,
            log: self.clone(),
        }
    }

    pub fn failing_writer(&self, index: usize, message: &str) -> RecordingWriter {
        RecordingWriter {
            index,
            result: Err(message.to_string()),
            gate: None,
            log: self.clone(),
        }
    }

    /// Writer that blocks until `gate` is notified, then records.
    pub fn gated_writer(&self, index: usize, result: Option<Value>, gate: Arc<Notify>) -> RecordingWriter {
        RecordingWriter {
            index,
            result: Ok(result),
            gate: Some(gate),
            log: self.clone(),
        }
    }

    /// Wait (bounded) until at least `count` writes have been recorded.
    pub async fn wait_for_writes(&self, count: usize) -> bool {
        for _ in 0..200 {
            if self.writes().len() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        false
    }
}

pub struct RecordingReader {
    index: usize,
    result: Result<Option<Value>, String>,
    log: CallLog,
}

#[async_trait]
impl Reader for RecordingReader {
    async fn read(&self, id: &Value) -> SourceResult {
        self.log.push(Call::Read(self.index, id.clone()));
        self.result.clone().map_err(Into::into)
    }
}

pub struct RecordingWriter {
    index: usize,
    result: Result<Option<Value>, String>,
    gate: Option<Arc<Notify>>,
    log: CallLog,
}

#[async_trait]
impl Writer for RecordingWriter {
    async fn write(&self, value: Value) -> SourceResult {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.log.push(Call::Write(self.index, value));
        self.result.clone().map_err(Into::into)
    }
}
