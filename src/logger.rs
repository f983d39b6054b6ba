//! Contextual logger.
//!
//! A [`Logger`] is a name plus a set of structured [`Fields`]. It never
//! changes after construction: [`Logger::with_context`], [`Logger::with_fields`]
//! and [`Logger::with_field`] each return a new logger and leave the original
//! alone, so one base logger can be shared by every request while each request
//! derives its own.
//!
//! Records go out through [`tracing`]. ctxlog has no formatter, sink or level
//! filter of its own. Install any subscriber you like; each event carries
//! `logger` (the name) and `fields` (`key=value` pairs in key order).
//!
//! ```rust
//! use ctxlog::{Context, Logger};
//!
//! let base = Logger::new("orders");
//! let ctx = Context::new().with_request_id("r-1").with_user_id("u123");
//!
//! let logger = base.with_context(&ctx).with_field("tenant", "acme");
//! assert_eq!(logger.field("user_id"), Some(&serde_json::json!("u123")));
//! assert!(base.fields().is_empty());
//!
//! logger.info("order created");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::{Level, Span, field};

use crate::context::Context;
use crate::error::Error;

/// Field key for the request identifier.
pub const REQUEST_ID_KEY: &str = "request_id";
/// Field key for the user identifier.
pub const USER_ID_KEY: &str = "user_id";
/// Field key for the trace identifier.
pub const TRACE_ID_KEY: &str = "trace_id";

/// Structured fields carried by a [`Logger`], ordered by key.
pub type Fields = BTreeMap<String, Value>;

static DEFAULT: OnceLock<Logger> = OnceLock::new();

// ── Logger ────────────────────────────────────────────────────────────────────

/// An immutable logger carrying structured fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Logger {
    name: Option<Arc<str>>,
    fields: Arc<Fields>,
}

impl Logger {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: Some(name.into()), fields: Arc::default() }
    }

    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn fields(&self) -> &Fields { &self.fields }
    pub fn field(&self, key: &str) -> Option<&Value> { self.fields.get(key) }

    /// Derives a logger carrying the identifiers present in `ctx` as
    /// `request_id`, `user_id` and `trace_id`.
    pub fn with_context(&self, ctx: &Context) -> Self {
        let ids = [
            (REQUEST_ID_KEY, ctx.request_id()),
            (USER_ID_KEY, ctx.user_id()),
            (TRACE_ID_KEY, ctx.trace_id()),
        ];
        self.with_fields(ids.into_iter().filter_map(|(key, id)| Some((key, id?))))
    }

    /// Derives a logger with `fields` merged in. On duplicate keys the new
    /// value wins, identifier keys included.
    pub fn with_fields<I, K, V>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut merged = Fields::clone(&self.fields);
        merged.extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self { name: self.name.clone(), fields: Arc::new(merged) }
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_fields([(key.into(), value.into())])
    }

    /// An `INFO` span named `request` carrying this logger's identifiers.
    ///
    /// Instrument a future with it so plain `tracing` macros inside the
    /// handler pick the identifiers up too.
    pub fn span(&self) -> Span {
        let span = tracing::info_span!(
            "request",
            logger = self.name(),
            request_id = field::Empty,
            user_id = field::Empty,
            trace_id = field::Empty
        );
        for key in [REQUEST_ID_KEY, USER_ID_KEY, TRACE_ID_KEY] {
            if let Some(value) = self.fields.get(key) {
                span.record(key, field::display(Bare(value)));
            }
        }
        span
    }

    // ── Emission ──────────────────────────────────────────────────────────────

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if level == Level::ERROR {
            self.error(message);
        } else if level == Level::WARN {
            self.warn(message);
        } else if level == Level::INFO {
            self.info(message);
        } else if level == Level::DEBUG {
            self.debug(message);
        } else {
            self.trace(message);
        }
    }

    pub fn trace(&self, message: impl fmt::Display) {
        tracing::trace!(logger = self.name(), fields = %FieldList(&self.fields), "{message}");
    }

    pub fn debug(&self, message: impl fmt::Display) {
        tracing::debug!(logger = self.name(), fields = %FieldList(&self.fields), "{message}");
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(logger = self.name(), fields = %FieldList(&self.fields), "{message}");
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(logger = self.name(), fields = %FieldList(&self.fields), "{message}");
    }

    pub fn error(&self, message: impl fmt::Display) {
        tracing::error!(logger = self.name(), fields = %FieldList(&self.fields), "{message}");
    }
}

// ── Lookup and the default logger ─────────────────────────────────────────────

/// Returns the logger stored in `ctx`, or [`default_logger`] if there is none.
pub fn from_context(ctx: &Context) -> Logger {
    ctx.logger().cloned().unwrap_or_else(default_logger)
}

/// Installs the process-wide fallback logger. Succeeds once.
pub fn set_default(logger: Logger) -> Result<(), Error> {
    DEFAULT.set(logger).map_err(|_| Error::DefaultLoggerSet)
}

/// The logger installed by [`set_default`], or an unnamed logger with no fields.
pub fn default_logger() -> Logger {
    DEFAULT.get().cloned().unwrap_or_default()
}

// ── Field rendering ───────────────────────────────────────────────────────────

/// Renders `k=v k=v`. Strings are written without quotes.
struct FieldList<'a>(&'a Fields);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={}", Bare(value))?;
        }
        Ok(())
    }
}

struct Bare<'a>(&'a Value);

impl fmt::Display for Bare<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}
