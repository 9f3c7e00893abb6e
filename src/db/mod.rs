//! Database access module
//!
//! The service owns no queries of its own: every call forwards parameters into a
//! stored procedure and hands back its single result column untouched.
//! `ProcedureStore` is the seam between the HTTP layer and the database.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use postgres::PgProcedureStore;

/// Stored procedures exposed by the LIWO database
#[async_trait]
pub trait ProcedureStore: Send + Sync {
    /// `website.sp_selectjson_maplayersets_groupedby_mapcategories()`
    async fn map_layer_sets(&self) -> Result<Value, sqlx::Error>;

    /// `website.sp_selectjson_maplayerset_floodscen_breachlocation_id_generic(breach_id, set_name)`
    async fn scenarios_per_breach(&self, breach_id: i32, set_name: &str)
        -> Result<Value, sqlx::Error>;

    /// `website.sp_selectjson_layerset_layerset_id(layerset_id)`
    async fn layer_set(&self, layerset_id: i32) -> Result<Value, sqlx::Error>;

    /// `static_information.sp_selectjson_breachlocationid(flood_simulation_id)`
    async fn breach_location_id(&self, flood_simulation_id: i32) -> Result<Value, sqlx::Error>;

    /// `website.sp_select_filepaths_maplayers(map_layers)`
    ///
    /// Returns the raw text column of every row, each a list of `<source>,<type>` pairs.
    async fn map_layer_file_paths(&self, map_layers: &str) -> Result<Vec<String>, sqlx::Error>;

    /// Every row of `table` (`schema.table`) as a GeoJSON `FeatureCollection`
    async fn export_table(&self, table: &str) -> Result<Value, sqlx::Error>;

    /// Connectivity probe used by the readiness endpoint
    async fn ping(&self) -> Result<(), sqlx::Error>;
}
