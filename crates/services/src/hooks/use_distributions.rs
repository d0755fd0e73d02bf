use std::sync::Arc;

use db::models::distribution::DistributionFilters;
use tokio::sync::watch;

use crate::{
    managers::{DistributionManager, DistributionState, Subscription},
    services::distribution::DistributionServiceError,
};

pub struct UseDistributionsHandle {
    manager: Arc<DistributionManager>,
    state: watch::Receiver<DistributionState>,
    _subscription: Subscription,
}

/// Binds to `manager` and performs the initial fetch. A failed initial
/// fetch is reported through `state().error`, not as an `Err`.
pub async fn use_distributions(manager: Arc<DistributionManager>) -> UseDistributionsHandle {
    let (tx, rx) = watch::channel(manager.state());
    let weak = Arc::downgrade(&manager);
    let subscription = manager.subscribe(move |_| {
        if let Some(manager) = weak.upgrade() {
            tx.send_replace(manager.state());
        }
    });

    let handle = UseDistributionsHandle {
        manager,
        state: rx,
        _subscription: subscription,
    };
    let _ = handle.manager.fetch_distributions().await;
    handle
}

impl UseDistributionsHandle {
    pub fn state(&self) -> DistributionState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every later state change
    pub fn watch(&self) -> watch::Receiver<DistributionState> {
        self.state.clone()
    }

    pub async fn refresh(&self) -> Result<(), DistributionServiceError> {
        self.manager.fetch_distributions().await
    }

    pub async fn set_filters(
        &self,
        update: DistributionFilters,
    ) -> Result<(), DistributionServiceError> {
        self.manager.set_filters(update).await
    }

    pub async fn replace_filters(
        &self,
        filters: DistributionFilters,
    ) -> Result<(), DistributionServiceError> {
        self.manager.replace_filters(filters).await
    }

    pub async fn set_page(&self, page: u32) -> Result<(), DistributionServiceError> {
        self.manager.set_page(page).await
    }

    pub async fn clear_filters(&self) -> Result<(), DistributionServiceError> {
        self.manager.clear_filters().await
    }

    pub async fn retry(&self) -> Result<(), DistributionServiceError> {
        self.manager.retry().await
    }
}

#[cfg(test)]
mod tests {
    use db::models::distribution::DistributionStatus;

    use super::*;
    use crate::services::{distribution::DistributionService, mock_data::MockDataService};

    fn manager() -> Arc<DistributionManager> {
        Arc::new(DistributionManager::new(DistributionService::new(Arc::new(
            MockDataService::builtin().unwrap(),
        ))))
    }

    #[tokio::test]
    async fn test_initial_fetch_and_updates_reach_watchers() {
        let handle = use_distributions(manager()).await;
        assert_eq!(handle.state().distributions.len(), 8);

        let mut watcher = handle.watch();
        watcher.borrow_and_update();
        handle
            .set_filters(DistributionFilters::with_status(DistributionStatus::Cancelled))
            .await
            .unwrap();

        assert!(watcher.has_changed().unwrap());
        let state = watcher.borrow_and_update().clone();
        assert_eq!(state.distributions.len(), 1);
        assert_eq!(state.distributions[0].id, "dist-005");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_replace_filters_clears_single_predicate() {
        let handle = use_distributions(manager()).await;
        handle
            .set_filters(DistributionFilters {
                region: Some("South".to_string()),
                status: Some(DistributionStatus::Cancelled),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(handle.state().distributions.len(), 1);

        handle
            .replace_filters(DistributionFilters::with_status(DistributionStatus::Cancelled))
            .await
            .unwrap();
        let state = handle.state();
        assert_eq!(state.filters.region, None);
        assert_eq!(state.distributions.len(), 1);
        assert_eq!(state.distributions[0].id, "dist-005");
    }

    #[tokio::test]
    async fn test_dropping_handle_unsubscribes() {
        let manager = manager();
        let handle = use_distributions(manager.clone()).await;
        let watcher = handle.watch();
        drop(handle);

        manager.set_page(2).await.unwrap();
        // The sender lived inside the dropped listener
        assert!(watcher.has_changed().is_err());
    }
}
