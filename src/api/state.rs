use std::sync::Arc;

use crate::config::Config;
use crate::downloader::Downloader;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub downloader: Arc<dyn Downloader>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            config: Arc::new(config),
            downloader,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
