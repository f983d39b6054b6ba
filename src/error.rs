//! Unified error type.

/// The error type returned by ctxlog's fallible operations.
///
/// Binding a logger to a request never fails. This type surfaces setup
/// mistakes: a bad header name in the environment, or installing the
/// process-wide default logger twice.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{var}: invalid header name: {source}")]
    InvalidHeaderName {
        var: &'static str,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("default logger already set")]
    DefaultLoggerSet,
}
