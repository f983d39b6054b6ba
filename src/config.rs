//! Binder configuration.
//!
//! Build a [`Config`] once at startup and hand it to
//! [`Binder::with_config`](crate::Binder::with_config). After that it is only
//! ever read, from every request at once.
//!
//! ```rust
//! use ctxlog::{Config, Fields, Logger, extract::header};
//! use http::request::Parts;
//!
//! let config = Config::new(Logger::new("api"))
//!     .skip_paths(["/healthz", "/readyz"])
//!     .extract_user_id(|parts: &Parts| header(parts, "x-user-id"))
//!     .extract_trace_id(|parts: &Parts| header(parts, "x-trace-id"))
//!     .custom_fields(|parts: &Parts| {
//!         Fields::from([("method".to_owned(), parts.method.as_str().into())])
//!     });
//!
//! assert!(config.is_skipped("/healthz"));
//! assert!(!config.is_skipped("/healthz/"));
//! ```

use std::collections::HashSet;
use std::fmt;

use http::HeaderName;

use crate::error::Error;
use crate::extract::{BoxedExtractor, Extractor};
use crate::logger::{Fields, Logger};
use crate::middleware::request_id::X_REQUEST_ID;

/// Comma-separated list of paths to leave uninstrumented.
pub const ENV_SKIP_PATHS: &str = "CTXLOG_SKIP_PATHS";
/// Header to read the request identifier from.
pub const ENV_REQUEST_ID_HEADER: &str = "CTXLOG_REQUEST_ID_HEADER";

/// What the binder does, and to which requests.
#[derive(Clone)]
pub struct Config {
    pub(crate) logger: Logger,
    pub(crate) skip_paths: HashSet<String>,
    pub(crate) request_id_header: HeaderName,
    pub(crate) extract_user_id: Option<BoxedExtractor<String>>,
    pub(crate) extract_trace_id: Option<BoxedExtractor<String>>,
    pub(crate) custom_fields: Option<BoxedExtractor<Fields>>,
}

impl Config {
    /// Every request gets a logger derived from `logger`; nothing is
    /// extracted beyond the request ID.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            skip_paths: HashSet::new(),
            request_id_header: X_REQUEST_ID.clone(),
            extract_user_id: None,
            extract_trace_id: None,
            custom_fields: None,
        }
    }

    /// [`Config::new`] plus skip paths and request-ID header from the process
    /// environment. See [`ENV_SKIP_PATHS`] and [`ENV_REQUEST_ID_HEADER`].
    pub fn from_env(logger: Logger) -> Result<Self, Error> {
        Self::from_lookup(logger, |key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(
        logger: Logger,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let mut config = Self::new(logger);

        if let Some(paths) = lookup(ENV_SKIP_PATHS) {
            config = config.skip_paths(
                paths.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_owned),
            );
        }

        if let Some(name) = lookup(ENV_REQUEST_ID_HEADER) {
            let name = HeaderName::try_from(name.trim())
                .map_err(|source| Error::InvalidHeaderName { var: ENV_REQUEST_ID_HEADER, source })?;
            config = config.request_id_header(name);
        }

        Ok(config)
    }

    /// Leave requests for exactly `path` uninstrumented. Returns `self` for chaining.
    pub fn skip_path(mut self, path: impl Into<String>) -> Self {
        self.skip_paths.insert(path.into());
        self
    }

    pub fn skip_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.skip_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Header consulted for the request ID when no [`RequestId`](crate::RequestId)
    /// extension is present. Defaults to `x-request-id`.
    pub fn request_id_header(mut self, name: HeaderName) -> Self {
        self.request_id_header = name;
        self
    }

    pub fn extract_user_id(mut self, f: impl Extractor<String>) -> Self {
        self.extract_user_id = Some(f.into_boxed_extractor());
        self
    }

    pub fn extract_trace_id(mut self, f: impl Extractor<String>) -> Self {
        self.extract_trace_id = Some(f.into_boxed_extractor());
        self
    }

    /// Extra fields merged into each request's logger after the identifiers.
    /// A key equal to `request_id`, `user_id` or `trace_id` overrides it.
    pub fn custom_fields(mut self, f: impl Extractor<Fields>) -> Self {
        self.custom_fields = Some(f.into_boxed_extractor());
        self
    }

    /// Exact match against the skip set. No prefix or pattern matching.
    pub fn is_skipped(&self, path: &str) -> bool {
        self.skip_paths.contains(path)
    }

    pub fn logger(&self) -> &Logger { &self.logger }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("logger", &self.logger)
            .field("skip_paths", &self.skip_paths)
            .field("request_id_header", &self.request_id_header)
            .field("extract_user_id", &self.extract_user_id.is_some())
            .field("extract_trace_id", &self.extract_trace_id.is_some())
            .field("custom_fields", &self.custom_fields.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::new(Logger::new("api"));
        assert!(config.skip_paths.is_empty());
        assert_eq!(config.request_id_header, X_REQUEST_ID);
        assert!(config.extract_user_id.is_none());
        assert_eq!(config.logger().name(), Some("api"));
    }

    #[test]
    fn skip_paths_match_exactly() {
        let config = Config::new(Logger::default()).skip_path("/health");
        assert!(config.is_skipped("/health"));
        assert!(!config.is_skipped("/health/live"));
        assert!(!config.is_skipped("/Health"));
        assert!(!config.is_skipped("/"));
    }

    #[test]
    fn env_skip_paths_are_trimmed() {
        let config = Config::from_lookup(
            Logger::default(),
            lookup(&[(ENV_SKIP_PATHS, " /healthz, /readyz ,,")]),
        )
        .unwrap();

        assert_eq!(config.skip_paths.len(), 2);
        assert!(config.is_skipped("/healthz"));
        assert!(config.is_skipped("/readyz"));
    }

    #[test]
    fn env_request_id_header() {
        let config = Config::from_lookup(
            Logger::default(),
            lookup(&[(ENV_REQUEST_ID_HEADER, "X-Correlation-Id")]),
        )
        .unwrap();

        assert_eq!(config.request_id_header, "x-correlation-id");
    }

    #[test]
    fn env_invalid_header_is_rejected() {
        let err = Config::from_lookup(
            Logger::default(),
            lookup(&[(ENV_REQUEST_ID_HEADER, "not a header")]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidHeaderName { var: ENV_REQUEST_ID_HEADER, .. }));
        assert!(err.to_string().starts_with(ENV_REQUEST_ID_HEADER));
    }

    #[test]
    fn empty_environment_matches_new() {
        let config = Config::from_lookup(Logger::default(), lookup(&[])).unwrap();
        assert!(config.skip_paths.is_empty());
        assert_eq!(config.request_id_header, X_REQUEST_ID);
    }

    #[test]
    fn debug_reports_configured_extractors() {
        let config = Config::new(Logger::default())
            .extract_trace_id(|_: &http::request::Parts| "t-1".to_owned());
        let debug = format!("{config:?}");
        assert!(debug.contains("extract_trace_id: true"), "{debug}");
        assert!(debug.contains("extract_user_id: false"), "{debug}");
    }
}
