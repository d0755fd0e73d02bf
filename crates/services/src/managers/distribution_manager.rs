use std::sync::Mutex;

use db::models::distribution::{Distribution, DistributionFilters};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;
use utils::response::{PaginatedResponse, total_pages};

use super::listeners::{Listeners, Subscription, lock_state};
use crate::services::distribution::{DistributionService, DistributionServiceError};

/// Derived from the last successful response; never set directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl Pagination {
    pub fn from_response<T>(res: &PaginatedResponse<T>) -> Self {
        Self {
            current_page: res.page,
            total_pages: total_pages(res.total, res.limit),
            total_items: res.total,
            items_per_page: res.limit,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionState {
    pub distributions: Vec<Distribution>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: DistributionFilters,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DistributionEvent {
    LoadingChanged(bool),
    DataChanged {
        distributions: Vec<Distribution>,
        pagination: Pagination,
    },
    ErrorChanged(Option<String>),
    FiltersChanged(DistributionFilters),
}

struct Inner {
    state: DistributionState,
    /// Bumped per request; only the newest response may touch the state
    request_seq: u64,
}

/// List view state: current page of distributions, filters and pagination.
pub struct DistributionManager {
    service: DistributionService,
    inner: Mutex<Inner>,
    listeners: Listeners<DistributionEvent>,
}

impl DistributionManager {
    pub fn new(service: DistributionService) -> Self {
        Self::with_filters(service, DistributionFilters::default())
    }

    pub fn with_filters(service: DistributionService, filters: DistributionFilters) -> Self {
        Self {
            service,
            inner: Mutex::new(Inner {
                state: DistributionState {
                    filters,
                    ..Default::default()
                },
                request_seq: 0,
            }),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DistributionEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn state(&self) -> DistributionState {
        lock_state(&self.inner).state.clone()
    }

    /// Fetches the page described by the current filters. The outcome is
    /// also recorded in the state (`distributions` or `error`).
    pub async fn fetch_distributions(&self) -> Result<(), DistributionServiceError> {
        let (seq, filters) = {
            let mut inner = lock_state(&self.inner);
            inner.request_seq += 1;
            inner.state.loading = true;
            (inner.request_seq, inner.state.filters.clone())
        };
        self.listeners.emit(&DistributionEvent::LoadingChanged(true));

        let result = self.service.get_distributions(&filters).await;

        let events = {
            let mut inner = lock_state(&self.inner);
            if inner.request_seq != seq {
                debug!(seq, latest = inner.request_seq, "Discarding stale distributions response");
                return result.map(|_| ());
            }
            let state = &mut inner.state;
            state.loading = false;
            match &result {
                Ok(res) => {
                    state.distributions = res.data.clone();
                    state.pagination = Pagination::from_response(res);
                    let mut events = Vec::with_capacity(3);
                    if state.error.take().is_some() {
                        events.push(DistributionEvent::ErrorChanged(None));
                    }
                    events.push(DistributionEvent::DataChanged {
                        distributions: state.distributions.clone(),
                        pagination: state.pagination.clone(),
                    });
                    events
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch distributions");
                    state.error = Some(e.to_string());
                    vec![DistributionEvent::ErrorChanged(state.error.clone())]
                }
            }
        };

        for event in &events {
            self.listeners.emit(event);
        }
        self.listeners.emit(&DistributionEvent::LoadingChanged(false));

        result.map(|_| ())
    }

    /// Overlays `update` on the current filters, goes back to page 1 and
    /// re-fetches.
    pub async fn set_filters(
        &self,
        update: DistributionFilters,
    ) -> Result<(), DistributionServiceError> {
        self.update_filters(|filters| {
            filters.merge(update);
            filters.page = Some(1);
        });
        self.fetch_distributions().await
    }

    /// Replaces every predicate with the ones in `filters`, so an unset field
    /// drops that predicate. The page size is kept unless `filters` sets one.
    pub async fn replace_filters(
        &self,
        filters: DistributionFilters,
    ) -> Result<(), DistributionServiceError> {
        self.update_filters(|current| {
            *current = DistributionFilters {
                page: Some(1),
                limit: filters.limit.or(current.limit),
                ..filters
            };
        });
        self.fetch_distributions().await
    }

    pub async fn set_page(&self, page: u32) -> Result<(), DistributionServiceError> {
        self.update_filters(|filters| filters.page = Some(page.max(1)));
        self.fetch_distributions().await
    }

    /// Drops every predicate but keeps the page size
    pub async fn clear_filters(&self) -> Result<(), DistributionServiceError> {
        self.update_filters(|filters| {
            *filters = DistributionFilters {
                limit: filters.limit,
                ..Default::default()
            };
        });
        self.fetch_distributions().await
    }

    /// Re-issues the last request unchanged
    pub async fn retry(&self) -> Result<(), DistributionServiceError> {
        self.fetch_distributions().await
    }

    fn update_filters(&self, apply: impl FnOnce(&mut DistributionFilters)) {
        let filters = {
            let mut inner = lock_state(&self.inner);
            apply(&mut inner.state.filters);
            inner.state.filters.clone()
        };
        self.listeners.emit(&DistributionEvent::FiltersChanged(filters));
    }
}
