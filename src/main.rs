use std::sync::Arc;
use tokio::sync::Notify;

mod api;
mod config;
mod db;
mod error;
mod export;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let store = Arc::new(db::PgProcedureStore::connect_lazy(&cfg.database)?);
    let procedures: Arc<dyn db::ProcedureStore> = store.clone();
    let state = Arc::new(config::AppState::new(&cfg, procedures));

    if !state.data_dir.is_dir() {
        logger::log_warning(&format!(
            "Data directory {} does not exist, ZIP exports will fail",
            state.data_dir.display()
        ));
    }

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &cfg);
    server::start_server_loop(listener, state, shutdown).await?;

    store.close().await;
    logger::log_info("Database pool closed, bye");
    Ok(())
}
