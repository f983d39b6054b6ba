//! Pre-assigned request identifiers.
//!
//! ctxlog never generates request IDs. It picks up the one an upstream layer
//! already assigned, in this order:
//!
//! 1. a [`RequestId`] in the request extensions,
//! 2. the configured header (`x-request-id` by default).
//!
//! Empty values count as absent.

use std::fmt;
use std::sync::Arc;

use http::HeaderName;
use http::request::Parts;

/// The conventional request-ID header.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A request identifier assigned by an upstream layer.
///
/// Insert it into the request extensions before the binder runs:
///
/// ```rust
/// use ctxlog::RequestId;
///
/// let mut req = http::Request::new(());
/// req.extensions_mut().insert(RequestId::new("req-7f3a"));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds the request's pre-assigned identifier, if any.
pub(crate) fn lookup(parts: &Parts, header: &HeaderName) -> Option<Arc<str>> {
    if let Some(id) = parts.extensions.get::<RequestId>().filter(|id| !id.0.is_empty()) {
        return Some(Arc::clone(&id.0));
    }

    parts.headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(builder: http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn extension_wins_over_header() {
        let parts = parts(
            http::Request::builder()
                .header("x-request-id", "from-header")
                .extension(RequestId::new("from-extension")),
        );

        assert_eq!(lookup(&parts, &X_REQUEST_ID).as_deref(), Some("from-extension"));
    }

    #[test]
    fn header_is_used_without_extension() {
        let parts = parts(http::Request::builder().header("x-request-id", "abc-123"));
        assert_eq!(lookup(&parts, &X_REQUEST_ID).as_deref(), Some("abc-123"));
    }

    #[test]
    fn configured_header_is_respected() {
        let parts = parts(
            http::Request::builder()
                .header("x-request-id", "ignored")
                .header("x-correlation-id", "corr-1"),
        );
        let header = HeaderName::from_static("x-correlation-id");

        assert_eq!(lookup(&parts, &header).as_deref(), Some("corr-1"));
    }

    #[test]
    fn empty_values_are_absent() {
        let parts = parts(
            http::Request::builder()
                .header("x-request-id", "")
                .extension(RequestId::new("")),
        );
        assert_eq!(lookup(&parts, &X_REQUEST_ID), None);
    }

    #[test]
    fn empty_extension_falls_through_to_header() {
        let parts = parts(
            http::Request::builder()
                .header("x-request-id", "abc")
                .extension(RequestId::new("")),
        );
        assert_eq!(lookup(&parts, &X_REQUEST_ID).as_deref(), Some("abc"));
    }

    #[test]
    fn missing_everywhere() {
        let parts = parts(http::Request::builder());
        assert_eq!(lookup(&parts, &X_REQUEST_ID), None);
    }
}
