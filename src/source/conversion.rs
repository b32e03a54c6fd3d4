//! Representation conversions between neighbouring sources
//!
//! A source at index `i` may store values in a different shape than the
//! source at `i - 1`. Its conversion pair translates between the two:
//! `read` maps this source's shape to the previous one, `write` maps the
//! previous shape to this one. Missing sides are identity.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A synchronous, pure value translator.
pub type ConvertFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Conversion pair for one source.
#[derive(Clone, Default)]
pub struct Conversion {
    read: Option<ConvertFn>,
    write: Option<ConvertFn>,
}

impl Conversion {
    /// Identity conversion in both directions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate values read from this source into the previous source's shape.
    pub fn with_read(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.read = Some(Arc::new(f));
        self
    }

    /// Translate values from the previous source's shape into this source's.
    pub fn with_write(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.write = Some(Arc::new(f));
        self
    }

    /// Conversion that renames top-level object fields.
    ///
    /// `read` maps `{from: to}` applied when translating toward the previous
    /// source, `write` the reverse direction. Fields not named are kept.
    pub fn rename(read: BTreeMap<String, String>, write: BTreeMap<String, String>) -> Self {
        let mut conversion = Self::new();
        if !read.is_empty() {
            conversion = conversion.with_read(move |value| rename_fields(value, &read));
        }
        if !write.is_empty() {
            conversion = conversion.with_write(move |value| rename_fields(value, &write));
        }
        conversion
    }

    /// Apply the read side (this source → previous source).
    pub fn read(&self, value: Value) -> Value {
        match &self.read {
            Some(f) => f(value),
            None => value,
        }
    }

    /// Apply the write side (previous source → this source).
    pub fn write(&self, value: Value) -> Value {
        match &self.write {
            Some(f) => f(value),
            None => value,
        }
    }

    /// True if neither side translates anything.
    pub fn is_identity(&self) -> bool {
        self.read.is_none() && self.write.is_none()
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// Rename top-level fields of an object. Non-objects pass through untouched.
fn rename_fields(value: Value, renames: &BTreeMap<String, String>) -> Value {
    match value {
        Value::Object(fields) => {
            let mut renamed = Map::with_capacity(fields.len());
            for (key, field) in fields {
                let key = renames.get(&key).cloned().unwrap_or(key);
                renamed.insert(key, field);
            }
            Value::Object(renamed)
        }
        other => other,
    }
}
