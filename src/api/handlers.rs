// Route handlers module
// Each handler parses its body, calls one stored procedure and wraps the result

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use super::types::{
    scenario_set_name, BreachLocationRequest, DownloadRequest, LayerSetRequest,
    LayerSetsEnvelope, LegacyResponse, ScenariosRequest,
};
use crate::config::AppState;
use crate::error::{Result, ServiceError};
use crate::export::{self, ExportError, ExportKind, GeneratedFile};
use crate::http;
use crate::logger;

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// `GET /`
pub fn version() -> Response<Full<Bytes>> {
    http::build_json_response(
        StatusCode::OK,
        &serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
    )
}

/// `Authentication.asmx/Login`: the layer sets wrapped in an anonymous session
pub async fn load_layer_sets(state: &Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let layersets = state.store.map_layer_sets().await?;
    let envelope = LayerSetsEnvelope::anonymous(layersets, &state.config.http.webservice_url);
    legacy_json(&envelope)
}

/// `FloodImage.asmx/GetScenariosPerBreachGeneric`
pub async fn scenarios_per_breach(
    body: &[u8],
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let request: ScenariosRequest = serde_json::from_slice(body)?;
    let breach_id = request.breachid.to_i32("breachid")?;
    let set_name = scenario_set_name(request.layername.as_deref());
    logger::log_debug(&format!("Scenarios for breach {breach_id} in {set_name}"));

    let result = state.store.scenarios_per_breach(breach_id, set_name).await?;
    legacy_json(&result)
}

/// `Maps.asmx/GetLayerSet`
pub async fn layer_set(body: &[u8], state: &Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let request: LayerSetRequest = serde_json::from_slice(body)?;
    let layerset_id = request.id.to_i32("id")?;

    let result = state.store.layer_set(layerset_id).await?;
    legacy_json(&result)
}

/// `Maps.asmx/GetBreachLocationId`
pub async fn breach_location_id(
    body: &[u8],
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let request: BreachLocationRequest = serde_json::from_slice(body)?;
    let flood_simulation_id = request.floodsimulationid.to_i32("floodsimulationid")?;

    let result = state.store.breach_location_id(flood_simulation_id).await?;
    legacy_json(&result)
}

/// `Maps.asmx/DownloadZipFileDataLayers`: ZIP of the tables and data files behind the requested layers
pub async fn download_zip(body: &[u8], state: &Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let request: DownloadRequest = serde_json::from_slice(body)?;
    let layers = export::validate_layers(&request.layers)?;
    if layers.is_empty() {
        return Err(ServiceError::BadRequest("No layers requested".to_string()));
    }

    let rows = state.store.map_layer_file_paths(&layers.join(",")).await?;
    let items = export::parse_rows(&rows)?;
    logger::log_debug(&format!(
        "Export of {} layer(s) lists {} item(s)",
        layers.len(),
        items.len()
    ));

    let mut tables = Vec::new();
    let mut paths = Vec::new();
    for item in items {
        match item.kind {
            ExportKind::Table => {
                export::validate_table(&item.source)?;
                if !tables.contains(&item.source) {
                    tables.push(item.source);
                }
            }
            ExportKind::File => paths.push(item.source),
        }
    }

    let mut generated = Vec::with_capacity(tables.len());
    for table in &tables {
        let collection = state.store.export_table(table).await?;
        generated.push(GeneratedFile {
            entry_name: export::table_entry_name(table),
            contents: collection.to_string().into_bytes(),
        });
    }

    let data_dir = state.data_dir.clone();
    let archive = tokio::task::spawn_blocking(move || -> std::result::Result<_, ExportError> {
        let files = if paths.is_empty() {
            Vec::new()
        } else {
            export::resolve_files(&data_dir, &paths)?
        };
        if generated.is_empty() && files.is_empty() {
            return Ok(None);
        }
        export::build_archive(&generated, &files).map(Some)
    })
    .await??;

    let Some(archive) = archive else {
        return Err(ServiceError::NotFound(
            "No data found for the requested layers".to_string(),
        ));
    };

    let file_name = export::attachment_name(request.name.as_deref());
    Ok(http::build_zip_response(archive, &file_name))
}

/// Readiness probe: 200 while the database answers, 503 otherwise
pub async fn readiness(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let database = tokio::time::timeout(READINESS_TIMEOUT, state.store.ping())
        .await
        .is_ok_and(|res| res.is_ok());

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    http::build_json_response(
        status,
        &serde_json::json!({
            "status": label,
            "checks": { "database": database },
        }),
    )
}

fn legacy_json<T: serde::Serialize>(payload: &T) -> Result<Response<Full<Bytes>>> {
    let wrapped = LegacyResponse::wrap(payload)?;
    Ok(http::build_json_response(StatusCode::OK, &wrapped))
}
