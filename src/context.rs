use std::sync::Arc;

use crate::config::AppConfig;
use crate::infra::github::RepositoryMetricsClient;
use crate::services::HttpTransport;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub metrics: RepositoryMetricsClient,
}

impl AppContext {
    pub fn new(config: AppConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            metrics: RepositoryMetricsClient::new(transport),
        }
    }
}
