use std::sync::Arc;

use db::seed::SeedError;

use super::{
    api_client::{ApiError, ApiService},
    chart::ChartService,
    config::ApiConfig,
    data_source::DistributionApi,
    distribution::DistributionService,
    mock_data::MockDataService,
};

/// The service graph a client builds once at startup and shares with its
/// managers. Pick the HTTP backend or the in-process mock.
#[derive(Clone)]
pub struct Services {
    pub distributions: DistributionService,
    pub charts: ChartService,
}

impl Services {
    pub fn from_api(api: Arc<dyn DistributionApi>) -> Self {
        let distributions = DistributionService::new(api);
        let charts = ChartService::new(distributions.clone());
        Self {
            distributions,
            charts,
        }
    }

    pub fn http(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::from_api(Arc::new(ApiService::new(config)?)))
    }

    pub fn mock() -> Result<Self, SeedError> {
        Ok(Self::from_api(Arc::new(MockDataService::builtin()?)))
    }
}
