use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::distribution::DistributionStatus;

/// One slice of the status pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChartData {
    pub status: DistributionStatus,
    pub count: u64,
    /// Whole percent of all distributions; the slices of one chart sum to 100
    pub percentage: u32,
}

/// One point of the beneficiaries timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimelineChartData {
    pub date: NaiveDate,
    /// Beneficiaries reached on `date`
    pub count: u64,
}
