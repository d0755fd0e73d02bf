//! Status breakdown and beneficiaries timeline derived from the full
//! distribution list.

use std::collections::{BTreeMap, HashMap};

use db::models::{
    chart::{StatusChartData, TimelineChartData},
    distribution::{Distribution, DistributionFilters, DistributionStatus},
};
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::debug;

use super::distribution::{DistributionService, DistributionServiceError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartServiceError {
    #[error("failed to load chart data: {0}")]
    Distributions(#[from] DistributionServiceError),
}

#[derive(Clone)]
pub struct ChartService {
    distributions: DistributionService,
}

impl ChartService {
    pub fn new(distributions: DistributionService) -> Self {
        Self { distributions }
    }

    pub async fn get_status_distribution(&self) -> Result<Vec<StatusChartData>, ChartServiceError> {
        let all = self
            .distributions
            .get_all_distributions(&DistributionFilters::default())
            .await?;
        let data = status_breakdown(&all);
        debug!(slices = data.len(), "Computed status breakdown");
        Ok(data)
    }

    pub async fn get_timeline_data(&self) -> Result<Vec<TimelineChartData>, ChartServiceError> {
        let all = self
            .distributions
            .get_all_distributions(&DistributionFilters::default())
            .await?;
        let data = beneficiary_timeline(&all);
        debug!(points = data.len(), "Computed beneficiaries timeline");
        Ok(data)
    }
}

/// One entry per status present, in status order. Percentages use the
/// largest-remainder method, so a non-empty breakdown sums to exactly 100.
pub fn status_breakdown(distributions: &[Distribution]) -> Vec<StatusChartData> {
    let mut counts: HashMap<DistributionStatus, u64> = HashMap::new();
    for distribution in distributions {
        *counts.entry(distribution.status).or_default() += 1;
    }

    let present: Vec<(DistributionStatus, u64)> = DistributionStatus::iter()
        .filter_map(|status| counts.get(&status).map(|&count| (status, count)))
        .collect();
    let percentages = largest_remainder_percentages(
        &present.iter().map(|&(_, count)| count).collect::<Vec<_>>(),
    );

    present
        .into_iter()
        .zip(percentages)
        .map(|((status, count), percentage)| StatusChartData {
            status,
            count,
            percentage,
        })
        .collect()
}

/// Beneficiaries reached per date, ascending by date
pub fn beneficiary_timeline(distributions: &[Distribution]) -> Vec<TimelineChartData> {
    let mut by_date = BTreeMap::new();
    for distribution in distributions {
        *by_date.entry(distribution.date).or_insert(0u64) += u64::from(distribution.beneficiaries);
    }

    by_date
        .into_iter()
        .map(|(date, count)| TimelineChartData { date, count })
        .collect()
}

fn largest_remainder_percentages(counts: &[u64]) -> Vec<u32> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut percentages: Vec<u32> = counts
        .iter()
        .map(|&count| (count * 100 / total) as u32)
        .collect();
    let assigned: u32 = percentages.iter().sum();

    // Ties go to the earlier entry
    let mut by_remainder: Vec<usize> = (0..counts.len()).collect();
    by_remainder.sort_by_key(|&i| std::cmp::Reverse(counts[i] * 100 % total));
    for &i in by_remainder.iter().take((100 - assigned) as usize) {
        percentages[i] += 1;
    }

    percentages
}
