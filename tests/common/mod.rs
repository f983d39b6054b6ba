//! Shared harness: a real hyper server on an ephemeral port and a raw
//! HTTP/1.1 client.

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use ctxlog::{Binder, from_request};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serves `binder` wrapped around [`echo_logger`] until the test runtime
/// shuts down. Returns the bound address.
pub async fn spawn(binder: Binder) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let svc = binder.service(service_fn(echo_logger));

            tokio::spawn(async move {
                let _ = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    addr
}

/// Responds with the name and fields of the logger bound to the request.
async fn echo_logger(req: http::Request<Incoming>) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let logger = from_request(&req);
    logger.info("echoing logger");

    let body = json!({ "name": logger.name(), "fields": logger.fields() });
    Ok(http::Response::new(Full::new(Bytes::from(body.to_string()))))
}

/// Sends `GET path` with `headers` and returns the parsed JSON body.
pub async fn get(addr: SocketAddr, path: &str, headers: &[(&str, &str)]) -> Value {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let mut request = format!("GET {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    let (_, body) = raw.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}
