use std::sync::Mutex;

use db::models::chart::{StatusChartData, TimelineChartData};
use tracing::{debug, warn};

use super::listeners::{Listeners, Subscription, lock_state};
use crate::services::chart::{ChartService, ChartServiceError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    pub status_data: Vec<StatusChartData>,
    pub timeline_data: Vec<TimelineChartData>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    LoadingChanged(bool),
    DataChanged {
        status_data: Vec<StatusChartData>,
        timeline_data: Vec<TimelineChartData>,
    },
    ErrorChanged(Option<String>),
}

struct Inner {
    state: ChartState,
    request_seq: u64,
}

/// Dashboard analytics: status breakdown and beneficiaries timeline
pub struct ChartManager {
    service: ChartService,
    inner: Mutex<Inner>,
    listeners: Listeners<ChartEvent>,
}

impl ChartManager {
    pub fn new(service: ChartService) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                state: ChartState::default(),
                request_seq: 0,
            }),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChartEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn state(&self) -> ChartState {
        lock_state(&self.inner).state.clone()
    }

    /// Loads both charts concurrently. Either failure fails the whole view
    /// and leaves the previous chart data in place.
    pub async fn fetch_chart_data(&self) -> Result<(), ChartServiceError> {
        let seq = {
            let mut inner = lock_state(&self.inner);
            inner.request_seq += 1;
            inner.state.loading = true;
            inner.request_seq
        };
        self.listeners.emit(&ChartEvent::LoadingChanged(true));

        let result = tokio::try_join!(
            self.service.get_status_distribution(),
            self.service.get_timeline_data()
        );

        let events = {
            let mut inner = lock_state(&self.inner);
            if inner.request_seq != seq {
                debug!(seq, "Discarding stale chart response");
                return result.map(|_| ());
            }
            let state = &mut inner.state;
            state.loading = false;
            match &result {
                Ok((status_data, timeline_data)) => {
                    state.status_data = status_data.clone();
                    state.timeline_data = timeline_data.clone();
                    let mut events = Vec::with_capacity(2);
                    if state.error.take().is_some() {
                        events.push(ChartEvent::ErrorChanged(None));
                    }
                    events.push(ChartEvent::DataChanged {
                        status_data: status_data.clone(),
                        timeline_data: timeline_data.clone(),
                    });
                    events
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch chart data");
                    state.error = Some(e.to_string());
                    vec![ChartEvent::ErrorChanged(state.error.clone())]
                }
            }
        };

        for event in &events {
            self.listeners.emit(event);
        }
        self.listeners.emit(&ChartEvent::LoadingChanged(false));

        result.map(|_| ())
    }

    pub async fn retry(&self) -> Result<(), ChartServiceError> {
        self.fetch_chart_data().await
    }
}
