//! Interchange: one read/write endpoint over an ordered chain of sources
//!
//! A chain is a primary source followed by any number of auxiliary sources,
//! typically a fast cache in front of slower stores and a default generator.
//! Reads fall through the chain until a source has the value, then backfill
//! every source that missed. Writes reach every source, either concurrently
//! or as a series where each source's representation is derived from its
//! neighbour's through a conversion pair.
//!
//! # Core Concepts
//!
//! - **Source**: a capability bundle (reader, writer, conversions, queue keys)
//! - **Boomerang**: forward-then-backward traversal that drives reads
//! - **Key queue**: per-key FIFO lanes serializing operations on one resource
//!
//! # Example
//!
//! ```
//! use interchange::{Interchange, InterchangeOptions, MemorySource, Source};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache = Arc::new(MemorySource::new("id"));
//! let origin = Arc::new(
//!     MemorySource::new("id").with_entries(vec![("1".to_string(), json!({"id": 1}))]),
//! );
//! let adapter = Interchange::build(
//!     vec![
//!         Source::new("cache").with_store(cache.clone()),
//!         Source::new("origin").with_store(origin),
//!     ],
//!     InterchangeOptions::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(adapter.read(&json!(1)).await.unwrap(), Some(json!({"id": 1})));
//! assert_eq!(cache.get("1"), Some(json!({"id": 1})));
//! # }
//! ```

pub mod config;
mod endpoint;
pub mod queue;
pub mod source;
pub mod traversal;

pub use config::{ChainConfig, ConfigError, ConvertConfig, SourceConfig};
pub use endpoint::{Interchange, InterchangeError, InterchangeOptions, InterchangeResult, WriteMode};
pub use queue::{KeyQueue, Lane, Ticket};
pub use source::{
    read_fn, write_fn, Conversion, MemorySource, QueueKey, ReadAction, Reader, ResultAction,
    Source, SourceChain, SourceError, SourceResult, Writer,
};
pub use traversal::{boomerang, Direction, Step, Traversal, Visitor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
