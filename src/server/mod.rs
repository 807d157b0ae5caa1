// Server module entry point
// Accept loop, per-connection serving and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub use connection::accept_connection;
pub use listener::create_reusable_listener;
pub use signal::start_signal_handler;

use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish once shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Accept connections until `shutdown` is notified.
///
/// After shutdown the listener is closed and open connections get a short
/// grace period; streams still running after that are cut off when the
/// runtime stops.
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    drain(&active_connections).await;
}

async fn drain(active_connections: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;

    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 {
            logger::log_info("All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!("Shutting down with {active} connection(s) still open"));
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
