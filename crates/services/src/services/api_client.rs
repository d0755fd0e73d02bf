//! HTTP client for the distributions API.

use std::time::Duration;

use async_trait::async_trait;
use db::models::distribution::{Distribution, DistributionFilters};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;
use utils::response::{ApiResponse, ErrorResponse, PaginatedResponse};

use super::{config::ApiConfig, data_source::DistributionApi};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Stateless client: one GET per call, no retries, aborted on timeout.
#[derive(Debug, Clone)]
pub struct ApiService {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiService {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("aid-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /api/distributions` with only the filters that are set
    pub fn distributions_url(&self, filters: &DistributionFilters) -> Url {
        let mut url = self.endpoint(&["api", "distributions"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(region) = &filters.region {
                query.append_pair("region", region);
            }
            if let Some(status) = filters.status {
                query.append_pair("status", &status.to_string());
            }
            if let Some(aid_type) = filters.aid_type {
                query.append_pair("aidType", &aid_type.to_string());
            }
            if let Some(channel) = filters.delivery_channel {
                query.append_pair("deliveryChannel", &channel.to_string());
            }
            if let Some(page) = filters.page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(limit) = filters.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        // Drop the dangling `?` when no filter is set
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }

    pub fn distribution_url(&self, id: &str) -> Url {
        self.endpoint(&["api", "distributions", id])
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        match res.status() {
            s if s.is_success() => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string())),
            StatusCode::NOT_FOUND => {
                let message = error_message(res)
                    .await
                    .unwrap_or_else(|| url.path().to_string());
                Err(ApiError::NotFound(message))
            }
            s => {
                let status = s.as_u16();
                let message = error_message(res)
                    .await
                    .unwrap_or_else(|| s.canonical_reason().unwrap_or("error").to_string());
                Err(ApiError::Http { status, message })
            }
        }
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Pulls `error` out of an `{ "error": ... }` body when the server sent one
async fn error_message(res: reqwest::Response) -> Option<String> {
    let body = res.text().await.ok()?;
    serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .ok()
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
}

#[async_trait]
impl DistributionApi for ApiService {
    async fn get_distributions(
        &self,
        filters: &DistributionFilters,
    ) -> Result<PaginatedResponse<Distribution>, ApiError> {
        self.get_json(self.distributions_url(filters)).await
    }

    async fn get_distribution_by_id(&self, id: &str) -> Result<Distribution, ApiError> {
        self.get_json::<ApiResponse<Distribution>>(self.distribution_url(id))
            .await
            .map(ApiResponse::into_data)
    }
}

#[cfg(test)]
mod tests {
    use db::models::distribution::{AidType, DistributionStatus};

    use super::*;

    fn client(base: &str) -> ApiService {
        ApiService::new(&ApiConfig::new(base)).unwrap()
    }

    #[test]
    fn test_url_without_filters_has_no_query() {
        let api = client("http://localhost:3001");
        assert_eq!(
            api.distributions_url(&DistributionFilters::default()).as_str(),
            "http://localhost:3001/api/distributions"
        );
    }

    #[test]
    fn test_url_contains_only_set_filters() {
        let api = client("http://localhost:3001/");
        let filters = DistributionFilters {
            status: Some(DistributionStatus::InProgress),
            aid_type: Some(AidType::Food),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            api.distributions_url(&filters).as_str(),
            "http://localhost:3001/api/distributions?status=In+Progress&aidType=Food&page=2"
        );
    }

    #[test]
    fn test_url_keeps_base_path_and_escapes_id() {
        let api = client("http://example.org/dashboard");
        assert_eq!(
            api.distribution_url("a/b c").as_str(),
            "http://example.org/dashboard/api/distributions/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiService::new(&ApiConfig::new("not a url")),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiService::new(&ApiConfig::new("mailto:someone@example.org")),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).to_string(),
            "Request timed out after 10000ms"
        );
        assert_eq!(
            ApiError::Http {
                status: 500,
                message: "boom".to_string()
            }
            .to_string(),
            "HTTP error 500: boom"
        );
    }
}
