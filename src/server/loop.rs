// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight requests may finish after the listener closes
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the accept loop until `shutdown` is notified, then drain active connections
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                break;
            }
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));
    drain_connections(graceful, &active_connections, DRAIN_TIMEOUT).await;
    Ok(())
}

/// Ask every open connection to close once its current request is done
///
/// Idle keep-alive connections close right away. Returns `false` when some are
/// still busy after `timeout`.
async fn drain_connections(
    graceful: GracefulShutdown,
    active_connections: &AtomicUsize,
    timeout: Duration,
) -> bool {
    tokio::select! {
        () = graceful.shutdown() => true,
        () = tokio::time::sleep(timeout) => {
            logger::log_warning(&format!(
                "Shutdown with {} connection(s) still open",
                active_connections.load(Ordering::SeqCst)
            ));
            false
        }
    }
}
