//! Shared application state

use crate::client::{GroqBackend, RotatingClient};
use crate::config::Settings;
use crate::scan::SkipFilter;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Counters exposed on the health endpoint
#[derive(Debug, Clone, Default)]
pub struct ServiceStats {
    pub batches: u64,
    pub files_reviewed: u64,
    pub files_failed: u64,
}

/// State shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,

    /// The rotation client mutates a cursor and a bound handle, so access
    /// is serialized behind an async mutex; one batch runs at a time.
    pub client: Arc<Mutex<RotatingClient<GroqBackend>>>,

    pub filter: Arc<SkipFilter>,
    pub stats: Arc<RwLock<ServiceStats>>,

    /// Pool size, cached so health checks never wait on a running batch
    pub key_count: usize,

    started_at: Instant,
}

impl AppState {
    pub fn new(settings: Settings, client: RotatingClient<GroqBackend>) -> Self {
        let filter = match &settings.skip_folders {
            Some(names) => SkipFilter::new(names),
            None => SkipFilter::default(),
        };

        Self {
            key_count: client.key_count(),
            settings: Arc::new(settings),
            client: Arc::new(Mutex::new(client)),
            filter: Arc::new(filter),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
