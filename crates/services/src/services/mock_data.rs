//! In-process stand-in for the mock API, for offline clients and tests.

use std::time::Duration;

use async_trait::async_trait;
use db::{
    models::distribution::{Distribution, DistributionFilters},
    seed::{SeedData, SeedError},
};
use utils::response::PaginatedResponse;

use super::{api_client::ApiError, data_source::DistributionApi};

/// Serves a fixed dataset with the same filter and paging rules as the server
#[derive(Debug, Clone)]
pub struct MockDataService {
    distributions: Vec<Distribution>,
    latency: Option<Duration>,
}

impl MockDataService {
    pub fn new(seed: SeedData) -> Self {
        Self {
            distributions: seed.distributions,
            latency: None,
        }
    }

    pub fn builtin() -> Result<Self, SeedError> {
        SeedData::builtin().map(Self::new)
    }

    /// Delay every response, to exercise loading states
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DistributionApi for MockDataService {
    async fn get_distributions(
        &self,
        filters: &DistributionFilters,
    ) -> Result<PaginatedResponse<Distribution>, ApiError> {
        self.simulate_latency().await;

        let matching: Vec<&Distribution> = self
            .distributions
            .iter()
            .filter(|d| filters.matches(d))
            .collect();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(filters.offset() as usize)
            .take(filters.limit() as usize)
            .cloned()
            .collect();

        Ok(PaginatedResponse::new(
            page,
            total,
            filters.page(),
            filters.limit(),
        ))
    }

    async fn get_distribution_by_id(&self, id: &str) -> Result<Distribution, ApiError> {
        self.simulate_latency().await;

        self.distributions
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Distribution {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use db::models::distribution::{DeliveryChannel, DistributionStatus};

    use super::*;

    #[tokio::test]
    async fn test_completed_filter() {
        let mock = MockDataService::builtin().unwrap();
        let res = mock
            .get_distributions(&DistributionFilters::with_status(
                DistributionStatus::Completed,
            ))
            .await
            .unwrap();
        assert_eq!(res.total, 3);
        assert_eq!(res.data.len(), 3);
    }

    #[tokio::test]
    async fn test_total_counts_before_slicing() {
        let mock = MockDataService::builtin().unwrap();
        let filters = DistributionFilters {
            region: Some("North".to_string()),
            limit: Some(2),
            ..Default::default()
        };
        let res = mock.get_distributions(&filters).await.unwrap();
        assert_eq!(res.total, 3);
        assert_eq!(res.data.len(), 2);
        assert_eq!((res.page, res.limit), (1, 2));

        let second = mock
            .get_distributions(&DistributionFilters {
                page: Some(2),
                ..filters
            })
            .await
            .unwrap();
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].id, "dist-007");
    }

    #[tokio::test]
    async fn test_channel_filter() {
        let mock = MockDataService::builtin().unwrap();
        let filters = DistributionFilters {
            delivery_channel: Some(DeliveryChannel::DirectDistribution),
            ..Default::default()
        };
        let res = mock.get_distributions(&filters).await.unwrap();
        let ids: Vec<_> = res.data.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["dist-001", "dist-004", "dist-008"]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mock = MockDataService::builtin().unwrap();
        assert!(matches!(
            mock.get_distribution_by_id("nope").await,
            Err(ApiError::NotFound(_))
        ));
        let known = mock.get_distribution_by_id("dist-005").await.unwrap();
        assert_eq!(known.status, DistributionStatus::Cancelled);
    }
}
