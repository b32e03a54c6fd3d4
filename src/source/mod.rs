//! Sources and the chain they form
//!
//! A source is a capability bundle: optional reader and writer, classifiers
//! for read outcomes, a conversion pair toward its predecessor, and optional
//! queue keys. The pipelines only see sources through this bundle.

mod conversion;
mod descriptor;
mod memory;
mod traits;

pub use conversion::{Conversion, ConvertFn};
pub use descriptor::{QueueKey, ReadErrorFn, ReadResultFn, Source, SourceChain};
pub use memory::{MemoryError, MemorySource};
pub use traits::{
    read_fn, write_fn, FnReader, FnWriter, ReadAction, Reader, ResultAction, SourceError,
    SourceResult, Writer,
};
