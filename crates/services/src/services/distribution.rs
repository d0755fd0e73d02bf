//! Facade over a [`DistributionApi`] used by managers and charts.

use std::sync::Arc;

use db::models::distribution::{Distribution, DistributionFilters, MAX_PAGE_SIZE};
use thiserror::Error;
use tracing::{debug, warn};
use utils::response::PaginatedResponse;

use super::{api_client::ApiError, data_source::DistributionApi};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DistributionServiceError {
    #[error("Distribution {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct DistributionService {
    api: Arc<dyn DistributionApi>,
}

impl DistributionService {
    pub fn new(api: Arc<dyn DistributionApi>) -> Self {
        Self { api }
    }

    pub async fn get_distributions(
        &self,
        filters: &DistributionFilters,
    ) -> Result<PaginatedResponse<Distribution>, DistributionServiceError> {
        let res = self.api.get_distributions(filters).await?;
        debug!(
            total = res.total,
            page = res.page,
            returned = res.data.len(),
            "Fetched distributions"
        );
        Ok(res)
    }

    /// Unknown ids fail with [`DistributionServiceError::NotFound`].
    pub async fn get_distribution_by_id(
        &self,
        id: &str,
    ) -> Result<Distribution, DistributionServiceError> {
        match self.api.get_distribution_by_id(id).await {
            Ok(distribution) if distribution.id == id => Ok(distribution),
            Ok(other) => {
                warn!(
                    requested = id,
                    returned = %other.id,
                    "API returned a different distribution"
                );
                Err(DistributionServiceError::NotFound(id.to_string()))
            }
            Err(ApiError::NotFound(_)) => Err(DistributionServiceError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Walks every page and returns all records matching the predicates in
    /// `filters`; its paging fields are ignored.
    pub async fn get_all_distributions(
        &self,
        filters: &DistributionFilters,
    ) -> Result<Vec<Distribution>, DistributionServiceError> {
        let mut query = DistributionFilters {
            page: Some(1),
            limit: Some(MAX_PAGE_SIZE),
            ..filters.clone()
        };
        let mut all = Vec::new();

        loop {
            let res = self.api.get_distributions(&query).await?;
            let received = res.data.len();
            all.extend(res.data);

            if received == 0 || all.len() as u64 >= res.total {
                break;
            }
            query.page = Some(query.page() + 1);
        }

        debug!(count = all.len(), "Fetched all distributions");
        Ok(all)
    }
}
