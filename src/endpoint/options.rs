//! Adapter options: write mode and key queue ownership

use super::error::InterchangeError;
use crate::queue::KeyQueue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How `write` propagates a value to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Convert top-down, then write bottom-up, each write feeding the next
    #[default]
    Series,
    /// Write the unconverted value to every source concurrently
    Parallel,
}

impl FromStr for WriteMode {
    type Err = InterchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "series" => Ok(Self::Series),
            "parallel" => Ok(Self::Parallel),
            other => Err(InterchangeError::configuration(format!(
                "unknown write mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Options fixed at adapter construction.
#[derive(Debug, Clone, Default)]
pub struct InterchangeOptions {
    /// Caller-owned queue; when absent the adapter creates its own
    pub queue: Option<Arc<KeyQueue>>,
    pub write_mode: WriteMode,
}

impl InterchangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(mut self, queue: Arc<KeyQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}
