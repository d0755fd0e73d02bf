//! Platform-agnostic state containers shared by the web and mobile clients.
//!
//! Each manager owns a state snapshot, exposes async actions that re-fetch
//! through the service layer, and notifies callback listeners after every
//! state change.

pub mod chart_manager;
pub mod distribution_manager;
pub mod listeners;
pub mod single_distribution_manager;

pub use chart_manager::{ChartEvent, ChartManager, ChartState};
pub use distribution_manager::{
    DistributionEvent, DistributionManager, DistributionState, Pagination,
};
pub use listeners::{Listeners, Subscription};
pub use single_distribution_manager::{
    SingleDistributionEvent, SingleDistributionManager, SingleDistributionState,
};
