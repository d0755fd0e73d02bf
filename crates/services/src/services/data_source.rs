use async_trait::async_trait;
use db::models::distribution::{Distribution, DistributionFilters};
use utils::response::PaginatedResponse;

use super::api_client::ApiError;

/// Anything that can answer the two distribution queries: the HTTP client or
/// the in-process mock.
#[async_trait]
pub trait DistributionApi: Send + Sync {
    async fn get_distributions(
        &self,
        filters: &DistributionFilters,
    ) -> Result<PaginatedResponse<Distribution>, ApiError>;

    async fn get_distribution_by_id(&self, id: &str) -> Result<Distribution, ApiError>;
}
