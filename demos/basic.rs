//! Minimal ctxlog example: a hyper server whose handlers log with the
//! request's identifiers already attached.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/orders -H 'x-request-id: r-1' -H 'x-user-id: u123'
//!   curl http://localhost:3000/orders -H 'traceparent: 00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01'
//!   curl http://localhost:3000/healthz          ← skipped, logs with the default logger

use std::convert::Infallible;

use bytes::Bytes;
use ctxlog::{Binder, Config, Fields, Logger, extract::header, from_request};
use http::request::Parts;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env(Logger::new("orders-api"))
        .expect("invalid ctxlog environment")
        .skip_path("/healthz")
        .extract_user_id(|parts: &Parts| header(parts, "x-user-id"))
        .extract_trace_id(trace_id)
        .custom_fields(|parts: &Parts| {
            Fields::from([("method".to_owned(), parts.method.as_str().into())])
        });
    let binder = Binder::with_config(config);

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind failed");
    info!(addr = "0.0.0.0:3000", "listening");

    let mut tasks = tokio::task::JoinSet::new();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let svc = binder.service(service_fn(route));
                tasks.spawn(async move {
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        error!(peer = %peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}
}

// Trace ID is the second segment of a W3C `traceparent` header.
fn trace_id(parts: &Parts) -> Option<String> {
    let traceparent = header(parts, "traceparent")?;
    traceparent.split('-').nth(1).map(str::to_owned)
}

async fn route(req: http::Request<Incoming>) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let logger = from_request(&req);

    let body = match req.uri().path() {
        "/healthz" => "ok",
        "/orders" => {
            logger.info("listing orders");
            r#"[{"id":"42"}]"#
        }
        path => {
            logger.warn(format_args!("no route for {path}"));
            "not found"
        }
    };

    Ok(http::Response::new(Full::new(Bytes::from_static(body.as_bytes()))))
}
