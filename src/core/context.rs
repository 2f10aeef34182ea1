//! Request-scoped context and context hooks
//!
//! A [`RequestContext`] travels with a unit of work (an HTTP request, a job)
//! and is handed to the `*_ctx` event constructors. When the logger has a
//! context hook registered, the hook turns the context into extra fields that
//! are attached to the event before any caller-set field.

use super::field::FieldValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable, cheaply cloneable bag of request-scoped values
///
/// Deriving a context with [`with_value`](Self::with_value) never changes the
/// parent, so a context can be shared freely across threads.
///
/// # Example
///
/// ```
/// use rust_event_logger::RequestContext;
///
/// let root = RequestContext::new();
/// let ctx = root.with_value("trace_id", "4bf92f35").with_value("user_id", 42);
///
/// assert!(root.is_empty());
/// assert_eq!(ctx.value("user_id").map(|v| v.to_string()), Some("42".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    values: Arc<HashMap<String, FieldValue>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a child context carrying one more value
    #[must_use]
    pub fn with_value<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
        }
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &HashMap<String, FieldValue> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Function deriving extra event fields from a request context
///
/// Hooks must be pure: they run on the logging thread for every event built
/// with a context.
#[derive(Clone)]
pub struct CtxHook(Arc<dyn Fn(&RequestContext) -> HashMap<String, FieldValue> + Send + Sync>);

impl CtxHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&RequestContext) -> HashMap<String, FieldValue> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn fields(&self, ctx: &RequestContext) -> HashMap<String, FieldValue> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for CtxHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CtxHook")
    }
}
