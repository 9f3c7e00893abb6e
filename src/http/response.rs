//! HTTP response building module
//!
//! Provides builders for the JSON, ZIP and status responses of the service.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ServiceError;

/// Methods advertised in `Allow` and CORS preflight responses
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

/// Build JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Internal server error"}"#,
                "application/json",
            );
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", json.len())
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build ZIP download response
pub fn build_zip_response(data: Vec<u8>, file_name: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/zip")
        .header("Content-Length", data.len())
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Full::new(Bytes::from(data)))
        .unwrap_or_else(|e| {
            log_build_error("ZIP", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build error response with a JSON `{"error": ...}` body
pub fn build_error_response(err: &ServiceError) -> Response<Full<Bytes>> {
    let status = err.status();
    let body = serde_json::json!({
        "error": err.public_message(),
        "code": status.as_u16(),
    });
    build_json_response(status, &body)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({"error": "Not Found", "code": 404}),
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large",
        "text/plain",
    )
}

/// Build OPTIONS response (preflight request)
///
/// `request_headers` echoes `Access-Control-Request-Headers` back to the browser.
pub fn build_options_response(
    enable_cors: bool,
    request_headers: Option<&str>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header(
                "Access-Control-Allow-Headers",
                request_headers.unwrap_or("Content-Type"),
            )
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build health check response (for liveness probe)
pub fn build_health_response(status: &'static str) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::OK, status, "text/plain")
}

/// Add the headers every response carries
pub fn finalize_response(
    mut response: Response<Full<Bytes>>,
    server_name: &str,
    enable_cors: bool,
) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    if enable_cors && !headers.contains_key(ACCESS_CONTROL_ALLOW_ORIGIN) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    response
}

fn build_plain_response(
    status: StatusCode,
    body: &'static str,
    content_type: &str,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = build_json_response(StatusCode::OK, &serde_json::json!({"d": "[]"}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(body_string(response).await, r#"{"d":"[]"}"#);
    }

    #[test]
    fn test_zip_response_headers() {
        let response = build_zip_response(vec![1, 2, 3], "test.zip");
        assert_eq!(response.headers()["content-type"], "application/zip");
        assert_eq!(response.headers()["content-length"], "3");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"test.zip\""
        );
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = build_error_response(&ServiceError::BadRequest("missing id".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "missing id");
        assert_eq!(body["code"], 400);
    }

    #[test]
    fn test_options_response_cors() {
        let response = build_options_response(true, Some("content-type, x-requested-with"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.headers()["access-control-allow-headers"],
            "content-type, x-requested-with"
        );

        let response = build_options_response(false, None);
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[test]
    fn test_finalize_response() {
        let response = finalize_response(build_health_response("ok"), "liwo-services", true);
        assert_eq!(response.headers()["server"], "liwo-services");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let response = finalize_response(build_health_response("ok"), "liwo-services", false);
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }
}
