//! In-memory `ProcedureStore` used by handler tests
//!
//! Returns canned results and records every call so tests can assert which
//! procedure received which parameters.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::ProcedureStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MapLayerSets,
    ScenariosPerBreach { breach_id: i32, set_name: String },
    LayerSet { layerset_id: i32 },
    BreachLocationId { flood_simulation_id: i32 },
    MapLayerFilePaths { map_layers: String },
    ExportTable { table: String },
    Ping,
}

#[derive(Default)]
pub struct MemoryStore {
    pub result: Value,
    pub file_paths: Vec<String>,
    pub fail: bool,
    calls: Mutex<Vec<Call>>,
}

impl MemoryStore {
    pub fn with_result(result: Value) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    pub fn with_file_paths(paths: &[&str]) -> Self {
        Self {
            file_paths: paths.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), sqlx::Error> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl ProcedureStore for MemoryStore {
    async fn map_layer_sets(&self) -> Result<Value, sqlx::Error> {
        self.record(Call::MapLayerSets)?;
        Ok(self.result.clone())
    }

    async fn scenarios_per_breach(
        &self,
        breach_id: i32,
        set_name: &str,
    ) -> Result<Value, sqlx::Error> {
        self.record(Call::ScenariosPerBreach {
            breach_id,
            set_name: set_name.to_string(),
        })?;
        Ok(self.result.clone())
    }

    async fn layer_set(&self, layerset_id: i32) -> Result<Value, sqlx::Error> {
        self.record(Call::LayerSet { layerset_id })?;
        Ok(self.result.clone())
    }

    async fn breach_location_id(&self, flood_simulation_id: i32) -> Result<Value, sqlx::Error> {
        self.record(Call::BreachLocationId {
            flood_simulation_id,
        })?;
        Ok(self.result.clone())
    }

    async fn map_layer_file_paths(&self, map_layers: &str) -> Result<Vec<String>, sqlx::Error> {
        self.record(Call::MapLayerFilePaths {
            map_layers: map_layers.to_string(),
        })?;
        Ok(self.file_paths.clone())
    }

    async fn export_table(&self, table: &str) -> Result<Value, sqlx::Error> {
        self.record(Call::ExportTable {
            table: table.to_string(),
        })?;
        Ok(serde_json::json!({
            "type": "FeatureCollection",
            "features": [],
            "name": table,
        }))
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.record(Call::Ping)
    }
}
