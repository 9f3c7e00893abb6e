// API module entry
// Legacy LIWO web-service routes (ASP.NET `.asmx` naming)

mod handlers;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::sync::Arc;

use crate::config::AppState;
use crate::http;
use crate::logger;

pub use handlers::readiness;

pub const LOGIN_PATH: &str = "/liwo.ws/Authentication.asmx/Login";
pub const SCENARIOS_PATH: &str = "/liwo.ws/Tools/FloodImage.asmx/GetScenariosPerBreachGeneric";
pub const LAYER_SET_PATH: &str = "/liwo.ws/Maps.asmx/GetLayerSet";
pub const BREACH_LOCATION_PATH: &str = "/liwo.ws/Maps.asmx/GetBreachLocationId";
pub const DOWNLOAD_ZIP_PATH: &str = "/liwo.ws/Maps.asmx/DownloadZipFileDataLayers";

const POST_ROUTES: [&str; 5] = [
    LOGIN_PATH,
    SCENARIOS_PATH,
    LAYER_SET_PATH,
    BREACH_LOCATION_PATH,
    DOWNLOAD_ZIP_PATH,
];

/// API route handler
///
/// Dispatches to handler functions based on request path and method.
/// Handler errors are logged and turned into JSON error responses.
pub async fn dispatch(
    method: &Method,
    path: &str,
    body: &Bytes,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let result = match (method, path) {
        (&Method::GET | &Method::HEAD, "/") => Ok(handlers::version()),
        (&Method::POST, LOGIN_PATH) => handlers::load_layer_sets(state).await,
        (&Method::POST, SCENARIOS_PATH) => handlers::scenarios_per_breach(body, state).await,
        (&Method::POST, LAYER_SET_PATH) => handlers::layer_set(body, state).await,
        (&Method::POST, BREACH_LOCATION_PATH) => handlers::breach_location_id(body, state).await,
        (&Method::POST, DOWNLOAD_ZIP_PATH) => handlers::download_zip(body, state).await,
        (_, "/") => return http::build_405_response("GET, HEAD, OPTIONS"),
        (_, p) if POST_ROUTES.contains(&p) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response("POST, OPTIONS");
        }
        _ => return http::build_404_response(),
    };

    result.unwrap_or_else(|err| {
        if err.status().is_server_error() {
            logger::log_error(&format!("{method} {path} failed: {err}"));
        } else {
            logger::log_warning(&format!("{method} {path} rejected: {err}"));
        }
        http::build_error_response(&err)
    })
}
