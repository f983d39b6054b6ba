//! Middleware layer.
//!
//! [`Binder`] gives every request its own [`Logger`]. Wrap your hyper service
//! with it and each request arrives carrying a [`Context`] whose logger already
//! knows the request ID, user ID, trace ID and whatever custom fields you
//! asked for. Handlers fetch it with [`from_request`]:
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use ctxlog::{Binder, Logger, from_request};
//! use hyper::service::Service;
//!
//! # async fn demo() {
//! let svc = Binder::new(Logger::new("api")).service(hyper::service::service_fn(
//!     |req: http::Request<http_body_util::Empty<bytes::Bytes>>| async move {
//!         from_request(&req).info("handling");
//!         Ok::<_, Infallible>(http::Response::new(http_body_util::Empty::<bytes::Bytes>::new()))
//!     },
//! ));
//!
//! let req = http::Request::builder()
//!     .uri("/orders")
//!     .header("x-request-id", "r-1")
//!     .body(http_body_util::Empty::new())
//!     .unwrap();
//! svc.call(req).await.unwrap();
//! # }
//! ```
//!
//! # Per-request steps
//!
//! 1. Path in the skip set → leave the request alone.
//! 2. Pick up the request ID (see [`request_id`]).
//! 3. Run the user-ID and trace-ID extractors; empty results are dropped.
//! 4. Derive the logger from the base logger and the identifiers.
//! 5. Merge custom fields, if the extractor returned any.
//! 6. Store the logger in a fresh [`Context`], replacing the old one.
//!
//! Binding never fails and never blocks. A panicking extractor is a bug in
//! the extractor and unwinds into hyper like any other handler panic.

pub mod request_id;

use std::sync::Arc;

use http::request::Parts;
use http::{Extensions, Request};
use hyper::service::Service;
use tracing::{debug, trace};

use crate::config::Config;
use crate::context::Context;
use crate::extract::BoxedExtractor;
use crate::logger::{self, Logger};

/// Outcome of [`Binder::bind_parts`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    /// The path is in the skip set; the request was not touched.
    Skipped,
    /// A logger-carrying [`Context`] was stored on the request.
    Bound,
}

// ── Binder ────────────────────────────────────────────────────────────────────

/// Attaches a per-request logger. Cheap to clone; the [`Config`] is shared.
#[derive(Clone, Debug)]
pub struct Binder {
    config: Arc<Config>,
}

impl Binder {
    /// Binds loggers derived from `logger`, with no skip paths or extractors.
    pub fn new(logger: Logger) -> Self {
        Self::with_config(Config::new(logger))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &Config { &self.config }

    /// Wraps `inner` so every request is bound before `inner` sees it.
    pub fn service<S>(&self, inner: S) -> BindLogger<S> {
        BindLogger { binder: self.clone(), inner }
    }

    /// Binds `req` and hands it back.
    pub fn bind<B>(&self, req: Request<B>) -> Request<B> {
        let (mut parts, body) = req.into_parts();
        self.bind_parts(&mut parts);
        Request::from_parts(parts, body)
    }

    /// Binds the request head in place.
    pub fn bind_parts(&self, parts: &mut Parts) -> Binding {
        let config = &*self.config;
        let head: &Parts = parts;

        if config.is_skipped(head.uri.path()) {
            trace!(path = head.uri.path(), "skipping request logger");
            return Binding::Skipped;
        }

        let mut ctx = Context::from_extensions(&head.extensions);

        if let Some(id) = request_id::lookup(head, &config.request_id_header) {
            ctx = ctx.with_request_id(id);
        }
        if let Some(id) = extract_id(config.extract_user_id.as_ref(), head) {
            ctx = ctx.with_user_id(id);
        }
        if let Some(id) = extract_id(config.extract_trace_id.as_ref(), head) {
            ctx = ctx.with_trace_id(id);
        }

        let mut logger = config.logger.with_context(&ctx);

        let fields = config.custom_fields.as_ref().and_then(|f| f(head));
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            logger = logger.with_fields(fields);
        }

        debug!(
            path = head.uri.path(),
            request_id = ctx.request_id(),
            user_id = ctx.user_id(),
            trace_id = ctx.trace_id(),
            "bound request logger"
        );

        parts.extensions.insert(ctx.with_logger(logger));
        Binding::Bound
    }
}

fn extract_id(extractor: Option<&BoxedExtractor<String>>, parts: &Parts) -> Option<String> {
    extractor.and_then(|f| f(parts)).filter(|id| !id.is_empty())
}

// ── Service wrapper ───────────────────────────────────────────────────────────

/// A hyper [`Service`] that binds a logger, then calls the inner service.
///
/// Obtain via [`Binder::service`]. Response, error and future types are the
/// inner service's own; nothing is boxed.
#[derive(Clone, Debug)]
pub struct BindLogger<S> {
    binder: Binder,
    inner: S,
}

impl<S> BindLogger<S> {
    pub fn inner(&self) -> &S { &self.inner }
}

impl<S, B> Service<Request<B>> for BindLogger<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn call(&self, req: Request<B>) -> Self::Future {
        self.inner.call(self.binder.bind(req))
    }
}

// ── Retrieval ─────────────────────────────────────────────────────────────────

/// The logger bound to `req`, or the [default logger](crate::default_logger)
/// if the request was skipped or never bound.
pub fn from_request<B>(req: &Request<B>) -> Logger {
    from_extensions(req.extensions())
}

/// Alias of [`from_request`].
pub fn get_logger<B>(req: &Request<B>) -> Logger {
    from_request(req)
}

/// Same as [`from_request`], for code that only holds the extensions.
pub fn from_extensions(extensions: &Extensions) -> Logger {
    extensions
        .get::<Context>()
        .map_or_else(logger::default_logger, logger::from_context)
}
