//! Extractor trait and type erasure.
//!
//! # How extraction functions are stored
//!
//! [`Config`](crate::Config) holds up to three caller-supplied functions, each
//! a different closure type. A struct field can only have one concrete type,
//! so every function is erased behind an `Arc<dyn Fn>` when it is registered:
//!
//! ```text
//! |parts: &Parts| header(parts, "x-user-id")   ← user writes this
//!        ↓ config.extract_user_id(f)
//! f.into_boxed_extractor()                    ← Extractor blanket impl
//!        ↓  stored as BoxedExtractor<String> = Arc<dyn Fn(&Parts) -> Option<String>>
//! (extractor)(&parts)  at request time        ← one vtable dispatch
//! ```
//!
//! A function may return either the bare value or an `Option` of it. Both go
//! through `Into<Option<T>>`, so `String` and `Option<String>` are accepted
//! for identifiers, `Fields` and `Option<Fields>` for custom fields.

use std::sync::Arc;

use http::request::Parts;

// ── Internal types ────────────────────────────────────────────────────────────

/// A type-erased extraction function shared across concurrent requests.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Extractor` trait's `into_boxed_extractor` method.
#[doc(hidden)]
pub type BoxedExtractor<T> = Arc<dyn Fn(&Parts) -> Option<T> + Send + Sync + 'static>;

// ── Public Extractor trait ────────────────────────────────────────────────────

/// Implemented for every valid extraction function.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the signature:
///
/// ```text
/// fn name(parts: &http::request::Parts) -> impl Into<Option<T>>
/// ```
///
/// Sealed through the private `Sealed` supertrait.
pub trait Extractor<T>: private::Sealed<T> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_extractor(self) -> BoxedExtractor<T>;
}

mod private {
    pub trait Sealed<T> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, R, T> private::Sealed<T> for F
where
    F: Fn(&Parts) -> R + Send + Sync + 'static,
    R: Into<Option<T>>,
{
}

impl<F, R, T> Extractor<T> for F
where
    F: Fn(&Parts) -> R + Send + Sync + 'static,
    R: Into<Option<T>> + 'static,
    T: 'static,
{
    fn into_boxed_extractor(self) -> BoxedExtractor<T> {
        Arc::new(move |parts: &Parts| -> Option<T> { self(parts).into() })
    }
}

/// Reads a header as a string. Missing or non-ASCII values yield `None`.
///
/// A convenience for the common case of pulling an identifier straight off
/// the request:
///
/// ```rust
/// use ctxlog::{Config, Logger, extract::header};
///
/// let config = Config::new(Logger::new("api"))
///     .extract_user_id(|parts: &http::request::Parts| header(parts, "x-user-id"));
/// ```
pub fn header(parts: &Parts, name: &str) -> Option<String> {
    parts.headers.get(name)?.to_str().ok().map(str::to_owned)
}
