// API types module
// Request bodies and response envelopes of the legacy web-service routes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

/// Fallback set for unknown or missing layer names
pub const DEFAULT_SCENARIO_SET: &str = "Waterdiepte_flood_scenario_set";

/// `.asmx` style envelope: the payload travels as JSON text in `d`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyResponse {
    pub d: String,
}

impl LegacyResponse {
    pub fn wrap<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            d: serde_json::to_string(payload)?,
        })
    }
}

/// Identifier sent by the frontend, either as a number or as numeric text
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LegacyId {
    Number(i64),
    Text(String),
}

impl LegacyId {
    pub fn to_i32(&self, field: &str) -> Result<i32, ServiceError> {
        let invalid = || ServiceError::BadRequest(format!("Invalid value for '{field}'"));
        match self {
            Self::Number(n) => i32::try_from(*n).map_err(|_| invalid()),
            Self::Text(s) => s.trim().parse::<i32>().map_err(|_| invalid()),
        }
    }
}

/// Body of `GetScenariosPerBreachGeneric`
#[derive(Debug, Deserialize)]
pub struct ScenariosRequest {
    pub breachid: LegacyId,
    #[serde(default)]
    pub layername: Option<String>,
}

/// Body of `GetLayerSet`
#[derive(Debug, Deserialize)]
pub struct LayerSetRequest {
    pub id: LegacyId,
}

/// Body of `GetBreachLocationId`
#[derive(Debug, Deserialize)]
pub struct BreachLocationRequest {
    pub floodsimulationid: LegacyId,
}

/// Body of `DownloadZipFileDataLayers`
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    /// Comma-separated map layer names
    #[serde(default)]
    pub layers: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of the former login call, kept because the frontend reads its layer sets from it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSetsEnvelope {
    pub mode: &'static str,
    pub layersets: Value,
    pub logged_in: bool,
    pub liwokey: &'static str,
    pub error: &'static str,
    pub user: GuestUser,
}

#[derive(Debug, Serialize)]
pub struct GuestUser {
    pub email: &'static str,
    pub message: &'static str,
    pub role: &'static str,
    pub name: &'static str,
    pub organisation: &'static str,
    pub tools: Vec<Value>,
    pub mymaps: Vec<Value>,
    pub mapextent: &'static str,
    #[serde(rename = "webserviceURL")]
    pub webservice_url: String,
    pub administrator: &'static str,
}

impl LayerSetsEnvelope {
    /// Anonymous session wrapping the layer sets
    pub fn anonymous(layersets: Value, webservice_url: &str) -> Self {
        Self {
            mode: "open",
            layersets,
            logged_in: false,
            liwokey: "-1",
            error: "",
            user: GuestUser {
                email: "",
                message: "",
                role: "Guest",
                name: "",
                organisation: "",
                tools: Vec::new(),
                mymaps: Vec::new(),
                mapextent: "",
                webservice_url: webservice_url.to_string(),
                administrator: "false",
            },
        }
    }
}

/// Map a frontend layer name onto the scenario set the database expects
pub fn scenario_set_name(layer_name: Option<&str>) -> &'static str {
    match layer_name {
        Some("waterdiepte") => "Waterdiepte_flood_scenario_set",
        Some("stroomsnelheid") => "Stroomsnelheid_flood_scenario_set",
        Some("stijgsnelheid") => "Stijgsnelheid_flood_scenario_set",
        Some("schade") => "Schade_flood_scenario_set",
        Some("slachtoffers") => "Slachtoffers_flood_scenario_set",
        Some("getroffenen") => "Getroffenen_flood_scenario_set",
        Some("aankomsttijd") => "Aankomsttijd_flood_scenario_set",
        _ => DEFAULT_SCENARIO_SET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_set_name() {
        assert_eq!(
            scenario_set_name(Some("stroomsnelheid")),
            "Stroomsnelheid_flood_scenario_set"
        );
        assert_eq!(
            scenario_set_name(Some("aankomsttijd")),
            "Aankomsttijd_flood_scenario_set"
        );
        assert_eq!(scenario_set_name(Some("onbekend")), DEFAULT_SCENARIO_SET);
        assert_eq!(scenario_set_name(Some("Schade")), DEFAULT_SCENARIO_SET);
        assert_eq!(scenario_set_name(None), DEFAULT_SCENARIO_SET);
    }

    #[test]
    fn test_legacy_id() {
        let req: LayerSetRequest = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(req.id.to_i32("id").unwrap(), 42);

        let req: LayerSetRequest = serde_json::from_value(json!({"id": " 17 "})).unwrap();
        assert_eq!(req.id.to_i32("id").unwrap(), 17);

        let req: LayerSetRequest = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert!(matches!(req.id.to_i32("id"), Err(ServiceError::BadRequest(_))));

        let req: LayerSetRequest = serde_json::from_value(json!({"id": 5_000_000_000_i64})).unwrap();
        assert!(req.id.to_i32("id").is_err());

        assert!(serde_json::from_value::<LayerSetRequest>(json!({"id": 1.5})).is_err());
        assert!(serde_json::from_value::<LayerSetRequest>(json!({})).is_err());
    }

    #[test]
    fn test_download_request_defaults() {
        let req: DownloadRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.layers, "");
        assert!(req.name.is_none());
    }

    #[test]
    fn test_layer_sets_envelope_shape() {
        let envelope = LayerSetsEnvelope::anonymous(json!([{"id": 1}]), "http://localhost:5000/liwo.ws/");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["mode"], "open");
        assert_eq!(value["layersets"], json!([{"id": 1}]));
        assert_eq!(value["loggedIn"], false);
        assert_eq!(value["liwokey"], "-1");
        assert_eq!(value["error"], "");
        assert_eq!(value["user"]["role"], "Guest");
        assert_eq!(value["user"]["tools"], json!([]));
        assert_eq!(value["user"]["mymaps"], json!([]));
        assert_eq!(value["user"]["webserviceURL"], "http://localhost:5000/liwo.ws/");
        assert_eq!(value["user"]["administrator"], "false");
    }

    #[test]
    fn test_legacy_response_wraps_as_text() {
        let wrapped = LegacyResponse::wrap(&json!({"breachlocationid": 12})).unwrap();
        assert_eq!(wrapped.d, r#"{"breachlocationid":12}"#);
    }
}
