//! In-memory keyed store
//!
//! Reference source used by the CLI and tests. Values are JSON objects keyed
//! by one of their fields; reads look an id up directly.

use super::traits::{Reader, SourceResult, Writer};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("value has no '{0}' field to key it by")]
    MissingKey(String),
}

/// A concurrent map of JSON values.
#[derive(Debug)]
pub struct MemorySource {
    key_field: String,
    entries: DashMap<String, Value>,
}

impl MemorySource {
    /// Create an empty store keyed by `key_field`.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            entries: DashMap::new(),
        }
    }

    /// Seed the store with entries.
    pub fn with_entries(self, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        for (key, value) in entries {
            self.entries.insert(key, value);
        }
        self
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }
}

/// Render an id or key field as a map key. Strings are used verbatim.
fn key_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Reader for MemorySource {
    async fn read(&self, id: &Value) -> SourceResult {
        Ok(self.get(&key_of(id)))
    }
}

#[async_trait]
impl Writer for MemorySource {
    async fn write(&self, value: Value) -> SourceResult {
        let key = value
            .get(&self.key_field)
            .map(key_of)
            .ok_or_else(|| MemoryError::MissingKey(self.key_field.clone()))?;
        self.entries.insert(key, value);
        Ok(None)
    }
}
