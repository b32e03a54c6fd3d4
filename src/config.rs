//! Declarative chain definitions
//!
//! A chain of in-memory sources described in YAML:
//!
//! ```yaml
//! write_mode: series
//! sources:
//!   - name: cache
//!     key_field: id
//!   - name: origin
//!     key_field: identifier
//!     entries:
//!       "1": { identifier: 1, name: "one" }
//!     convert:
//!       read: { identifier: id }
//!       write: { id: identifier }
//! ```

use crate::endpoint::{Interchange, InterchangeOptions, WriteMode};
use crate::source::{Conversion, MemorySource, QueueKey, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid chain: {0}")]
    Invalid(String),
}

/// Field renames applied in each direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Renames applied when passing a value to the previous source
    #[serde(default)]
    pub read: BTreeMap<String, String>,
    /// Renames applied when receiving a value from the previous source
    #[serde(default)]
    pub write: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_key_field() -> String {
    "id".to_string()
}

/// One memory-backed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default = "default_key_field")]
    pub key_field: String,
    /// Seed entries, keyed like the store keys them
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
    #[serde(default = "default_true")]
    pub read: bool,
    #[serde(default = "default_true")]
    pub write: bool,
    #[serde(default = "default_true")]
    pub write_missing_read: bool,
    #[serde(default = "default_true")]
    pub write_wait: bool,
    #[serde(default)]
    pub queue_read_key: Option<String>,
    #[serde(default)]
    pub queue_write_key: Option<String>,
    #[serde(default)]
    pub convert: Option<ConvertConfig>,
}

/// A whole chain plus adapter options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub write_mode: WriteMode,
    pub sources: Vec<SourceConfig>,
}

impl ChainConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no sources defined".to_string()));
        }
        if let Some(index) = self.sources.iter().position(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("source {} has no name", index)));
        }
        Ok(())
    }

    /// Build the adapter. The memory stores are returned alongside it, in
    /// chain order, so callers can inspect what was written.
    pub fn build(&self) -> Result<(Interchange, Vec<Arc<MemorySource>>), ConfigError> {
        self.validate()?;
        let mut sources = Vec::with_capacity(self.sources.len());
        let mut stores = Vec::with_capacity(self.sources.len());

        for config in &self.sources {
            let store = Arc::new(
                MemorySource::new(config.key_field.clone()).with_entries(config.entries.clone()),
            );
            let mut source = Source::new(config.name.clone())
                .write_missing_read(config.write_missing_read)
                .write_wait(config.write_wait);
            if config.read {
                source = source.with_reader(store.clone());
            }
            if config.write {
                source = source.with_writer(store.clone());
            }
            if let Some(key) = &config.queue_read_key {
                source = source.with_queue_read_key(QueueKey::literal(key.clone()));
            }
            if let Some(key) = &config.queue_write_key {
                source = source.with_queue_write_key(QueueKey::literal(key.clone()));
            }
            if let Some(convert) = &config.convert {
                source = source.with_conversion(Conversion::rename(
                    convert.read.clone(),
                    convert.write.clone(),
                ));
            }
            sources.push(source);
            stores.push(store);
        }

        let options = InterchangeOptions::new().with_write_mode(self.write_mode);
        let adapter = Interchange::build(sources, options)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok((adapter, stores))
    }
}
