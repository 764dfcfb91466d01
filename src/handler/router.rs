//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, target
//! resolution, file serving, and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{resolve, static_files};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{HeaderName, CONTENT_LENGTH, HOST, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Never fails: every rejection becomes a response carrying the isolation headers.
/// The request body is ignored.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let response = match respond(&parts, &state).await {
        Ok(response) => response,
        Err(err) => http::build_error_response(&err),
    };

    if state.access_log {
        log_access(&parts, &response, remote_addr, started, &state);
    }
    Ok(response)
}

async fn respond(parts: &Parts, state: &AppState) -> Result<Response<ResponseBody>, ServeError> {
    check_http_method(&parts.method)?;

    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let host = parts.headers.get(HOST).and_then(|v| v.to_str().ok());
    let path = resolve::resolve_target(&state.root, target, host)?;

    static_files::serve_file(&path, parts.method == Method::HEAD).await
}

fn check_http_method(method: &Method) -> Result<(), ServeError> {
    match *method {
        Method::GET | Method::HEAD => Ok(()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Err(ServeError::MethodNotAllowed)
        }
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<ResponseBody>,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr,
        parts.method.to_string(),
        parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.to_string(), ToString::to_string),
    );
    entry.http_version = version_str(parts.version);
    entry.status = response.status().as_u16();
    entry.body_bytes = body_bytes(response, &parts.method);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.elapsed = started.elapsed();

    logger::log_access(&entry, &state.access_log_format);
}

fn body_bytes(response: &Response<ResponseBody>, method: &Method) -> u64 {
    if *method == Method::HEAD {
        return 0;
    }
    response.body().size_hint().exact().unwrap_or_else(|| {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    })
}

const fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
