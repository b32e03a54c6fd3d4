//! Reader and Writer traits: the contract a backend implements
//!
//! A source's I/O is split into two independent capabilities so a chain can
//! mix read-only origins, write-only sinks and full read/write stores.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Error returned by a source's read or write.
///
/// Carried unchanged inside `InterchangeError` so callers can downcast it.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a single source operation. `None` means "no value here".
pub type SourceResult = Result<Option<Value>, SourceError>;

/// How the read pipeline treats a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadAction {
    /// Abort the whole read
    #[default]
    Throw,
    /// Treat the failure as "no value" and try the next source
    Fallback,
}

/// How the read pipeline treats a successful, defined read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultAction {
    /// Accept the value
    #[default]
    Return,
    /// Discard the value and try the next source
    Fallback,
}

/// Reads values by id.
#[async_trait]
pub trait Reader: Send + Sync {
    /// Look up `id`. `Ok(None)` continues the search at the next source.
    async fn read(&self, id: &Value) -> SourceResult;
}

/// Persists values.
#[async_trait]
pub trait Writer: Send + Sync {
    /// Store `value`. A returned `Some` replaces the value propagated onward.
    async fn write(&self, value: Value) -> SourceResult;
}

#[async_trait]
impl<R: Reader + ?Sized> Reader for Arc<R> {
    async fn read(&self, id: &Value) -> SourceResult {
        (**self).read(id).await
    }
}

#[async_trait]
impl<W: Writer + ?Sized> Writer for Arc<W> {
    async fn write(&self, value: Value) -> SourceResult {
        (**self).write(value).await
    }
}

/// Reader backed by an async closure. Built with [`read_fn`].
pub struct FnReader<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Wrap an async closure `Fn(Value) -> Future<Output = SourceResult>` as a [`Reader`].
pub fn read_fn<F, Fut>(f: F) -> FnReader<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = SourceResult> + Send,
{
    FnReader {
        f,
        _fut: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> Reader for FnReader<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = SourceResult> + Send,
{
    async fn read(&self, id: &Value) -> SourceResult {
        (self.f)(id.clone()).await
    }
}

/// Writer backed by an async closure. Built with [`write_fn`].
pub struct FnWriter<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Wrap an async closure `Fn(Value) -> Future<Output = SourceResult>` as a [`Writer`].
pub fn write_fn<F, Fut>(f: F) -> FnWriter<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = SourceResult> + Send,
{
    FnWriter {
        f,
        _fut: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> Writer for FnWriter<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = SourceResult> + Send,
{
    async fn write(&self, value: Value) -> SourceResult {
        (self.f)(value).await
    }
}
