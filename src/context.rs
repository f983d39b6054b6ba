//! Request-scoped context carrier.
//!
//! A [`Context`] is an immutable bag of per-request values: the request,
//! user and trace identifiers and the [`Logger`] derived from them. It is
//! never modified in place. Every `with_*` call returns a new `Context` and
//! leaves the receiver untouched, so a handler holding an older copy keeps
//! seeing exactly what it saw before.
//!
//! The carrier travels inside the request's [`http::Extensions`]. Whoever
//! wants to change it derives a new one and inserts it, replacing the old:
//!
//! ```rust
//! use ctxlog::Context;
//!
//! let mut req = http::Request::new(());
//! let ctx = Context::from_extensions(req.extensions()).with_user_id("u123");
//! req.extensions_mut().insert(ctx);
//!
//! assert_eq!(Context::from_extensions(req.extensions()).user_id(), Some("u123"));
//! ```

use std::sync::Arc;

use http::Extensions;

use crate::logger::Logger;

/// Per-request key-value carrier. Cloning is one atomic increment.
#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Clone, Debug, Default)]
struct Inner {
    request_id: Option<Arc<str>>,
    user_id: Option<Arc<str>>,
    trace_id: Option<Arc<str>>,
    logger: Option<Logger>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context stored in `extensions`, or an empty one.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<Self>().cloned().unwrap_or_default()
    }

    pub fn with_request_id(&self, id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        self.derive(|inner| inner.request_id = Some(id))
    }

    pub fn with_user_id(&self, id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        self.derive(|inner| inner.user_id = Some(id))
    }

    pub fn with_trace_id(&self, id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        self.derive(|inner| inner.trace_id = Some(id))
    }

    pub fn with_logger(&self, logger: Logger) -> Self {
        self.derive(|inner| inner.logger = Some(logger))
    }

    pub fn request_id(&self) -> Option<&str> { self.inner.request_id.as_deref() }
    pub fn user_id(&self) -> Option<&str> { self.inner.user_id.as_deref() }
    pub fn trace_id(&self) -> Option<&str> { self.inner.trace_id.as_deref() }
    pub fn logger(&self) -> Option<&Logger> { self.inner.logger.as_ref() }

    /// `true` when both handles point at the same stored values.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn derive(&self, update: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = Inner::clone(&self.inner);
        update(&mut inner);
        Self { inner: Arc::new(inner) }
    }
}
