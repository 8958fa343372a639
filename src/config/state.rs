// Application state module
// Shared, read-only state handed to every connection task

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use super::types::Config;
use crate::handler::StaticFiles;
use crate::logger::LogFormat;

/// Application state
pub struct AppState {
    pub config: Config,
    pub files: StaticFiles,
    /// Parsed once from `logging.access_log_format`
    pub access_log_format: LogFormat,
    pub active_connections: AtomicUsize,
    /// Notified whenever `active_connections` drops to zero
    pub connections_idle: Notify,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let files = StaticFiles::new(config.root_dir.clone());
        let access_log_format = LogFormat::from(config.logging.access_log_format.as_str());
        Self {
            config,
            files,
            access_log_format,
            active_connections: AtomicUsize::new(0),
            connections_idle: Notify::new(),
        }
    }

    /// Decrement the connection counter, waking drain waiters at zero
    pub fn release_connection(&self) {
        if self.active_connections.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.connections_idle.notify_waiters();
        }
    }

    /// Wait until no connection is being served
    pub async fn wait_idle(&self) {
        loop {
            // registered before the load so a release in between is not missed
            let idle = self.connections_idle.notified();
            if self.active_connections.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }
}
