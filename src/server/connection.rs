//! Per-connection request handling for the bundled adapter.
//!
//! Translates between hyper's request/response types and the framework's
//! environment/response contract, and emits one access log entry per
//! request.

use crate::app::App;
use crate::config::LoggingConfig;
use crate::context::Environment;
use crate::http::response::Response;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Serve one accepted connection until the peer closes or errors.
pub(crate) async fn handle(
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    app: Arc<App>,
    logging: Arc<LoggingConfig>,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| {
        let app = Arc::clone(&app);
        let logging = Arc::clone(&logging);
        async move { Ok::<_, Infallible>(process(req, peer, &app, &logging).await) }
    });

    let conn = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(io, service);

    if let Err(err) = conn.await {
        logger::log_connection_error(&err);
    }
}

/// Run one request through the dispatcher and convert the result.
async fn process(
    req: Request<hyper::body::Incoming>,
    peer: SocketAddr,
    app: &App,
    logging: &LoggingConfig,
) -> hyper::Response<Full<Bytes>> {
    let started = Instant::now();

    let mut entry = AccessLogEntry::new(
        peer.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_string(req.version()).to_string();
    entry.referer = header_string(&req, "referer");
    entry.user_agent = header_string(&req, "user-agent");

    let environment = build_environment(&req, peer);
    let response = app.handle(environment).await;

    entry.status = response.status;
    entry.body_bytes = response.body.len();
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if logging.access_log {
        logger::log_access(&entry, &logging.access_log_format);
    }

    into_hyper_response(response).await
}

/// Build the environment mapping handed to handlers: request line facts plus
/// all headers under `HTTP_*` keys. The request body is not read.
pub(crate) fn build_environment<B>(req: &Request<B>, peer: SocketAddr) -> Environment {
    let mut environment = Environment::new();
    environment.insert(
        "REQUEST_METHOD".to_string(),
        req.method().as_str().to_string(),
    );
    environment.insert("PATH_INFO".to_string(), req.uri().path().to_string());
    environment.insert(
        "QUERY_STRING".to_string(),
        req.uri().query().unwrap_or("").to_string(),
    );
    environment.insert("REMOTE_ADDR".to_string(), peer.ip().to_string());
    environment.insert(
        "SERVER_PROTOCOL".to_string(),
        format!("HTTP/{}", version_string(req.version())),
    );

    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            let key = format!(
                "HTTP_{}",
                name.as_str().to_ascii_uppercase().replace('-', "_")
            );
            environment.insert(key, value.to_string());
        }
    }

    environment
}

/// Convert a framework response into a hyper response, consuming any
/// file-backed body through its already-open handle.
pub(crate) async fn into_hyper_response(response: Response) -> hyper::Response<Full<Bytes>> {
    let status = response.status;
    let headers = response.headers;

    let bytes = match response.body.into_bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            logger::log_error(&format!("Failed to read response body: {err}"));
            return plain_error_response();
        }
    };

    let mut builder = hyper::Response::builder().status(status);
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder = builder.header("Content-Length", bytes.len());

    builder.body(Full::new(bytes)).unwrap_or_else(|err| {
        logger::log_error(&format!("Failed to build response: {err}"));
        plain_error_response()
    })
}

fn plain_error_response() -> hyper::Response<Full<Bytes>> {
    let mut response = hyper::Response::new(Full::new(Bytes::from_static(b"internal error")));
    *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    response
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn version_string(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
