pub mod beneficiary;
pub mod chart;
pub mod distribution;
