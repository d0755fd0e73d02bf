use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    managers::{ChartManager, ChartState, Subscription},
    services::chart::ChartServiceError,
};

pub struct UseChartsHandle {
    manager: Arc<ChartManager>,
    state: watch::Receiver<ChartState>,
    _subscription: Subscription,
}

pub async fn use_charts(manager: Arc<ChartManager>) -> UseChartsHandle {
    let (tx, rx) = watch::channel(manager.state());
    let weak = Arc::downgrade(&manager);
    let subscription = manager.subscribe(move |_| {
        if let Some(manager) = weak.upgrade() {
            tx.send_replace(manager.state());
        }
    });

    let handle = UseChartsHandle {
        manager,
        state: rx,
        _subscription: subscription,
    };
    let _ = handle.manager.fetch_chart_data().await;
    handle
}

impl UseChartsHandle {
    pub fn state(&self) -> ChartState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ChartState> {
        self.state.clone()
    }

    pub async fn refresh(&self) -> Result<(), ChartServiceError> {
        self.manager.fetch_chart_data().await
    }

    pub async fn retry(&self) -> Result<(), ChartServiceError> {
        self.manager.retry().await
    }
}
