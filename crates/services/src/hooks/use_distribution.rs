use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    managers::{SingleDistributionManager, SingleDistributionState, Subscription},
    services::distribution::DistributionServiceError,
};

pub struct UseDistributionHandle {
    manager: Arc<SingleDistributionManager>,
    state: watch::Receiver<SingleDistributionState>,
    _subscription: Subscription,
}

/// Binds to `manager` and loads `id`
pub async fn use_distribution(
    manager: Arc<SingleDistributionManager>,
    id: &str,
) -> UseDistributionHandle {
    let (tx, rx) = watch::channel(manager.state());
    let weak = Arc::downgrade(&manager);
    let subscription = manager.subscribe(move |_| {
        if let Some(manager) = weak.upgrade() {
            tx.send_replace(manager.state());
        }
    });

    let handle = UseDistributionHandle {
        manager,
        state: rx,
        _subscription: subscription,
    };
    let _ = handle.manager.fetch(id).await;
    handle
}

impl UseDistributionHandle {
    pub fn state(&self) -> SingleDistributionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SingleDistributionState> {
        self.state.clone()
    }

    /// Switch the view to another distribution
    pub async fn load(&self, id: &str) -> Result<(), DistributionServiceError> {
        self.manager.fetch(id).await
    }

    pub async fn retry(&self) -> Result<(), DistributionServiceError> {
        self.manager.retry().await
    }
}
