//! # ctxlog
//!
//! Per-request contextual loggers for hyper services.
//!
//! ## The contract
//!
//! Every request that reaches your handler carries a [`Logger`] that already
//! knows who and what the request is about: request ID, user ID, trace ID and
//! any custom fields you extract. Handlers ask for it and log. They never
//! thread identifiers through by hand.
//!
//! What ctxlog leaves to others:
//!
//! - **Formatting, levels, sinks**: your `tracing` subscriber
//! - **Request ID generation**: an upstream layer or the proxy in front
//! - **Serving and routing**: hyper and whatever sits on top of it
//!
//! What's left for ctxlog:
//!
//! - Skip list: exact-path opt-out for health checks and the like
//! - Extraction: caller-supplied functions over the request head
//! - Binding: an immutable [`Context`] in the request extensions
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::convert::Infallible;
//!
//! use bytes::Bytes;
//! use ctxlog::{Binder, Config, Logger, extract::header, from_request};
//! use http::request::Parts;
//! use http_body_util::Full;
//! use hyper::body::Incoming;
//! use hyper::service::service_fn;
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder as ConnBuilder;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let binder = Binder::with_config(
//!         Config::new(Logger::new("api"))
//!             .skip_path("/healthz")
//!             .extract_user_id(|parts: &Parts| header(parts, "x-user-id")),
//!     );
//!
//!     let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     loop {
//!         let (stream, _) = listener.accept().await.unwrap();
//!         let svc = binder.service(service_fn(hello));
//!         tokio::spawn(async move {
//!             let _ = ConnBuilder::new(TokioExecutor::new())
//!                 .serve_connection(TokioIo::new(stream), svc)
//!                 .await;
//!         });
//!     }
//! }
//!
//! async fn hello(req: http::Request<Incoming>) -> Result<http::Response<Full<Bytes>>, Infallible> {
//!     from_request(&req).info("saying hello");
//!     Ok(http::Response::new(Full::new(Bytes::from("hello"))))
//! }
//! ```

mod config;
mod context;
mod error;
mod logger;

pub mod extract;
pub mod middleware;

pub use config::{Config, ENV_REQUEST_ID_HEADER, ENV_SKIP_PATHS};
pub use context::Context;
pub use error::Error;
pub use extract::Extractor;
pub use logger::{
    Fields, Logger, REQUEST_ID_KEY, TRACE_ID_KEY, USER_ID_KEY, default_logger, from_context,
    set_default,
};
pub use middleware::request_id::{RequestId, X_REQUEST_ID};
pub use middleware::{BindLogger, Binder, Binding, from_extensions, from_request, get_logger};
