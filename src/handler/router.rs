//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: access logging, CORS preflight,
//! body limits, health probes and dispatch to the API routes.

use crate::api;
use crate::config::{AppState, HealthConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{ACCESS_CONTROL_REQUEST_HEADERS, CONTENT_LENGTH};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let mut entry = state.access_log.then(|| {
        AccessLogEntry::from_request(
            &peer_addr,
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        )
    });

    let (parts, body) = req.into_parts();
    let response = match read_body(&parts.method, &parts.headers, body, &state).await {
        Ok(bytes) => route(&parts.method, parts.uri.path(), &parts.headers, bytes, &state).await,
        Err(resp) => resp,
    };
    let response = http::finalize_response(
        response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request whose body has been read
pub async fn route(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: Bytes,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    // 1. CORS preflight for every path
    if *method == Method::OPTIONS {
        let requested = headers
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .and_then(|v| v.to_str().ok());
        return http::build_options_response(state.config.http.enable_cors, requested);
    }

    // 2. Health check endpoints
    if let Some(resp) = check_health(method, path, &state.config.health, state).await {
        return resp;
    }

    // 3. Legacy web-service routes
    api::dispatch(method, path, &body, state).await
}

async fn check_health(
    method: &Method,
    path: &str,
    health: &HealthConfig,
    state: &Arc<AppState>,
) -> Option<Response<Full<Bytes>>> {
    if !health.enabled || !matches!(*method, Method::GET | Method::HEAD) {
        return None;
    }
    if path == health.liveness_path {
        return Some(http::build_health_response("ok"));
    }
    if path == health.readiness_path {
        return Some(api::readiness(state).await);
    }
    None
}

/// Collect the request body, enforcing `http.max_body_size`
async fn read_body<B>(
    method: &Method,
    headers: &HeaderMap,
    body: B,
    state: &Arc<AppState>,
) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(Bytes::new());
    }

    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(headers, max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_error_response(&crate::error::ServiceError::BadRequest(
                "Failed to read request body".to_string(),
            )))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
