//! Source descriptors and the ordered chain they form

use super::conversion::Conversion;
use super::traits::{ReadAction, Reader, ResultAction, SourceError, Writer};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Classifies a failed read.
pub type ReadErrorFn = Arc<dyn Fn(&SourceError) -> ReadAction + Send + Sync>;

/// Classifies a defined read result.
pub type ReadResultFn = Arc<dyn Fn(&Value) -> ResultAction + Send + Sync>;

/// Key used to serialize a source operation through the key queue.
#[derive(Clone)]
pub enum QueueKey {
    /// The same key for every call
    Literal(String),
    /// Derived from the read id or the write payload
    Derived(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl QueueKey {
    pub fn literal(key: impl Into<String>) -> Self {
        Self::Literal(key.into())
    }

    pub fn derived(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    /// Resolve the key for one call.
    pub fn resolve(&self, value: &Value) -> String {
        match self {
            Self::Literal(key) => key.clone(),
            Self::Derived(f) => f(value),
        }
    }
}

impl fmt::Debug for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(key) => f.debug_tuple("Literal").field(key).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// One participant in a chain: the capabilities it exposes and how the
/// pipelines should treat it.
///
/// Every capability is optional. A source without a reader is skipped by
/// reads, one without a writer is skipped by writes.
#[derive(Clone)]
pub struct Source {
    name: String,
    reader: Option<Arc<dyn Reader>>,
    writer: Option<Arc<dyn Writer>>,
    read_error: Option<ReadErrorFn>,
    read_result: Option<ReadResultFn>,
    conversion: Conversion,
    write_missing_read: bool,
    write_wait: bool,
    queue_read_key: Option<QueueKey>,
    queue_write_key: Option<QueueKey>,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reader: None,
            writer: None,
            read_error: None,
            read_result: None,
            conversion: Conversion::new(),
            write_missing_read: true,
            write_wait: true,
            queue_read_key: None,
            queue_write_key: None,
        }
    }

    pub fn with_reader(mut self, reader: impl Reader + 'static) -> Self {
        self.reader = Some(Arc::new(reader));
        self
    }

    pub fn with_writer(mut self, writer: impl Writer + 'static) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Use one shared backend as both reader and writer.
    pub fn with_store<S: Reader + Writer + 'static>(mut self, store: Arc<S>) -> Self {
        self.reader = Some(store.clone());
        self.writer = Some(store);
        self
    }

    pub fn with_read_error(
        mut self,
        f: impl Fn(&SourceError) -> ReadAction + Send + Sync + 'static,
    ) -> Self {
        self.read_error = Some(Arc::new(f));
        self
    }

    pub fn with_read_result(
        mut self,
        f: impl Fn(&Value) -> ResultAction + Send + Sync + 'static,
    ) -> Self {
        self.read_result = Some(Arc::new(f));
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Whether a backfilling read writes into this source (default true).
    pub fn write_missing_read(mut self, enabled: bool) -> Self {
        self.write_missing_read = enabled;
        self
    }

    /// Whether writes to this source are awaited (default true).
    pub fn write_wait(mut self, enabled: bool) -> Self {
        self.write_wait = enabled;
        self
    }

    pub fn with_queue_read_key(mut self, key: QueueKey) -> Self {
        self.queue_read_key = Some(key);
        self
    }

    pub fn with_queue_write_key(mut self, key: QueueKey) -> Self {
        self.queue_write_key = Some(key);
        self
    }

    // === Accessors used by the pipelines ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reader(&self) -> Option<&Arc<dyn Reader>> {
        self.reader.as_ref()
    }

    pub fn writer(&self) -> Option<&Arc<dyn Writer>> {
        self.writer.as_ref()
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn writes_missing_read(&self) -> bool {
        self.write_missing_read
    }

    pub fn waits_for_write(&self) -> bool {
        self.write_wait
    }

    pub fn classify_read_error(&self, err: &SourceError) -> ReadAction {
        self.read_error.as_ref().map_or(ReadAction::Throw, |f| f(err))
    }

    pub fn classify_read_result(&self, value: &Value) -> ResultAction {
        self.read_result.as_ref().map_or(ResultAction::Return, |f| f(value))
    }

    pub fn read_key(&self, id: &Value) -> Option<String> {
        self.queue_read_key.as_ref().map(|key| key.resolve(id))
    }

    pub fn write_key(&self, value: &Value) -> Option<String> {
        self.queue_write_key.as_ref().map(|key| key.resolve(value))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("reader", &self.reader.is_some())
            .field("writer", &self.writer.is_some())
            .field("conversion", &self.conversion)
            .field("write_missing_read", &self.write_missing_read)
            .field("write_wait", &self.write_wait)
            .field("queue_read_key", &self.queue_read_key)
            .field("queue_write_key", &self.queue_write_key)
            .finish()
    }
}

/// An ordered, non-empty, immutable list of sources.
///
/// Index 0 is the primary source; later indexes are auxiliary fallbacks.
#[derive(Debug, Clone)]
pub struct SourceChain {
    sources: Arc<[Source]>,
}

impl SourceChain {
    /// Build a chain. Returns `None` when `sources` is empty.
    pub fn new(sources: Vec<Source>) -> Option<Self> {
        if sources.is_empty() {
            return None;
        }
        Some(Self {
            sources: sources.into(),
        })
    }

    pub fn last_index(&self) -> usize {
        self.sources.len() - 1
    }
}

impl Deref for SourceChain {
    type Target = [Source];

    fn deref(&self) -> &[Source] {
        &self.sources
    }
}
