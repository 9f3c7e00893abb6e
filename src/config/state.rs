// Application state module
// Shared, read-only state handed to every connection

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::db::ProcedureStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ProcedureStore>,
    pub data_dir: PathBuf,
    pub access_log: bool,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn ProcedureStore>) -> Self {
        Self {
            config: config.clone(),
            store,
            data_dir: PathBuf::from(&config.data.dir),
            access_log: config.logging.access_log,
        }
    }
}
