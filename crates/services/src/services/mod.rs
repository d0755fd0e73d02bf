pub mod api_client;
pub mod chart;
pub mod config;
pub mod container;
pub mod data_source;
pub mod distribution;
pub mod mock_data;
