//! Reactive bindings over the managers. Each handle mirrors its manager's
//! state into a `watch` channel that UI code can await or poll.

pub mod use_charts;
pub mod use_distribution;
pub mod use_distributions;

pub use use_charts::{UseChartsHandle, use_charts};
pub use use_distribution::{UseDistributionHandle, use_distribution};
pub use use_distributions::{UseDistributionsHandle, use_distributions};
