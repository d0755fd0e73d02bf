use std::sync::Mutex;

use db::models::distribution::Distribution;
use tracing::{debug, warn};

use super::listeners::{Listeners, Subscription, lock_state};
use crate::services::distribution::{DistributionService, DistributionServiceError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleDistributionState {
    pub id: Option<String>,
    pub distribution: Option<Distribution>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SingleDistributionEvent {
    LoadingChanged(bool),
    DataChanged(Distribution),
    ErrorChanged(Option<String>),
}

struct Inner {
    state: SingleDistributionState,
    request_seq: u64,
}

/// Detail view state for one distribution
pub struct SingleDistributionManager {
    service: DistributionService,
    inner: Mutex<Inner>,
    listeners: Listeners<SingleDistributionEvent>,
}

impl SingleDistributionManager {
    pub fn new(service: DistributionService) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                state: SingleDistributionState::default(),
                request_seq: 0,
            }),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SingleDistributionEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn state(&self) -> SingleDistributionState {
        lock_state(&self.inner).state.clone()
    }

    /// Loads `id`. A record for a different id is cleared first so the view
    /// never shows the previous distribution under the new id.
    pub async fn fetch(&self, id: &str) -> Result<(), DistributionServiceError> {
        let seq = {
            let mut inner = lock_state(&self.inner);
            inner.request_seq += 1;
            let state = &mut inner.state;
            if state.id.as_deref() != Some(id) {
                state.distribution = None;
            }
            state.id = Some(id.to_string());
            state.loading = true;
            inner.request_seq
        };
        self.listeners.emit(&SingleDistributionEvent::LoadingChanged(true));

        let result = self.service.get_distribution_by_id(id).await;

        let events = {
            let mut inner = lock_state(&self.inner);
            if inner.request_seq != seq {
                debug!(id, "Discarding stale distribution response");
                return result.map(|_| ());
            }
            let state = &mut inner.state;
            state.loading = false;
            match &result {
                Ok(distribution) => {
                    state.distribution = Some(distribution.clone());
                    let mut events = Vec::with_capacity(2);
                    if state.error.take().is_some() {
                        events.push(SingleDistributionEvent::ErrorChanged(None));
                    }
                    events.push(SingleDistributionEvent::DataChanged(distribution.clone()));
                    events
                }
                Err(e) => {
                    warn!(id, error = %e, "Failed to fetch distribution");
                    state.distribution = None;
                    state.error = Some(e.to_string());
                    vec![SingleDistributionEvent::ErrorChanged(state.error.clone())]
                }
            }
        };

        for event in &events {
            self.listeners.emit(event);
        }
        self.listeners.emit(&SingleDistributionEvent::LoadingChanged(false));

        result.map(|_| ())
    }

    /// Re-fetches the last requested id; a no-op before the first fetch
    pub async fn retry(&self) -> Result<(), DistributionServiceError> {
        let id = lock_state(&self.inner).state.id.clone();
        match id {
            Some(id) => self.fetch(&id).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use db::models::distribution::DistributionFilters;
    use utils::response::PaginatedResponse;

    use super::*;
    use crate::services::{
        api_client::ApiError, data_source::DistributionApi, mock_data::MockDataService,
    };

    /// Detail lookups fail while `offline` is set
    struct Flaky {
        inner: MockDataService,
        offline: AtomicBool,
    }

    #[async_trait]
    impl DistributionApi for Flaky {
        async fn get_distributions(
            &self,
            filters: &DistributionFilters,
        ) -> Result<PaginatedResponse<Distribution>, ApiError> {
            self.inner.get_distributions(filters).await
        }

        async fn get_distribution_by_id(&self, id: &str) -> Result<Distribution, ApiError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(ApiError::Network("connection reset".to_string()));
            }
            self.inner.get_distribution_by_id(id).await
        }
    }

    fn manager() -> SingleDistributionManager {
        SingleDistributionManager::new(DistributionService::new(Arc::new(
            MockDataService::builtin().unwrap(),
        )))
    }

    #[tokio::test]
    async fn test_fetch_known_id() {
        let manager = manager();
        let events = Arc::new(Mutex::new(Vec::new()));
        let _subscription = {
            let events = events.clone();
            manager.subscribe(move |e| events.lock().unwrap().push(e.clone()))
        };

        manager.fetch("dist-002").await.unwrap();

        let state = manager.state();
        assert_eq!(state.id.as_deref(), Some("dist-002"));
        assert_eq!(state.distribution.unwrap().region, "South");
        assert!(!state.loading);
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_id_sets_error_and_retry_repeats_it() {
        let manager = manager();
        manager.fetch("dist-001").await.unwrap();

        let err = manager.fetch("missing").await.unwrap_err();
        assert_eq!(err, DistributionServiceError::NotFound("missing".to_string()));

        let state = manager.state();
        assert_eq!(state.distribution, None);
        assert_eq!(state.error.as_deref(), Some("Distribution missing not found"));

        assert!(manager.retry().await.is_err());
        assert_eq!(manager.state().id.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_retry_after_network_error_clears_error() {
        let api = Arc::new(Flaky {
            inner: MockDataService::builtin().unwrap(),
            offline: AtomicBool::new(true),
        });
        let manager = SingleDistributionManager::new(DistributionService::new(api.clone()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let _subscription = {
            let events = events.clone();
            manager.subscribe(move |e| events.lock().unwrap().push(e.clone()))
        };

        assert!(manager.fetch("dist-003").await.is_err());
        assert_eq!(manager.state().error.as_deref(), Some("Network error: connection reset"));

        api.offline.store(false, Ordering::SeqCst);
        manager.retry().await.unwrap();

        let state = manager.state();
        assert_eq!(state.error, None);
        assert_eq!(state.distribution.map(|d| d.id), Some("dist-003".to_string()));

        let events = events.lock().unwrap();
        assert!(matches!(events[1], SingleDistributionEvent::ErrorChanged(Some(_))));
        assert_eq!(events[3], SingleDistributionEvent::LoadingChanged(true));
        assert_eq!(events[4], SingleDistributionEvent::ErrorChanged(None));
        assert!(matches!(events[5], SingleDistributionEvent::DataChanged(_)));
        assert_eq!(events.last(), Some(&SingleDistributionEvent::LoadingChanged(false)));
    }

    #[tokio::test]
    async fn test_retry_before_fetch_is_noop() {
        let manager = manager();
        manager.retry().await.unwrap();
        assert_eq!(manager.state(), SingleDistributionState::default());
    }
}
