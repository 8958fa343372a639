// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::{accept_connection, connection_timeout};
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Accept connections until `signals` requests shutdown
///
/// The listener is dropped as soon as shutdown is requested. The function
/// then waits for connections already being served to finish, bounded by the
/// per-connection timeout, so returning from here (and dropping the runtime)
/// does not cut off in-flight responses.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = signals.shutdown.notified() => {
                logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&state).await;
}

/// Wait for in-flight connections, giving up after the connection timeout
async fn drain_connections(state: &AppState) {
    let deadline = connection_timeout(&state.config.performance);
    if deadline.is_zero() {
        state.wait_idle().await;
    } else if tokio::time::timeout(deadline, state.wait_idle()).await.is_err() {
        logger::log_warning(&format!(
            "{} connections still active after {} second drain, closing",
            state.active_connections.load(Ordering::SeqCst),
            deadline.as_secs()
        ));
    }
    tracing::info!("Server stopped");
}
