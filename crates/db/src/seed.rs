//! Seed dataset in the json-server `db.json` layout.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::distribution::Distribution;

const BUILTIN_DATASET: &str = include_str!("../seed/db.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate distribution id in seed data: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedData {
    pub distributions: Vec<Distribution>,
}

impl SeedData {
    /// The 8-record dataset compiled into the binary
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_json(BUILTIN_DATASET)
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let data: Self = serde_json::from_str(json)?;
        data.check_unique_ids()?;
        Ok(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn check_unique_ids(&self) -> Result<(), SeedError> {
        let mut seen = std::collections::HashSet::new();
        for distribution in &self.distributions {
            if !seen.insert(distribution.id.as_str()) {
                return Err(SeedError::DuplicateId(distribution.id.clone()));
            }
        }
        Ok(())
    }
}
