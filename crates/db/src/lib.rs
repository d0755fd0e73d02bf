use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use thiserror::Error;
use tracing::info;

pub mod models;
pub mod seed;

use models::{beneficiary::Beneficiary, distribution::Distribution};
use seed::{SeedData, SeedError};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// In-memory store holding the read-only distribution records.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Creates a fresh in-memory database and loads the built-in dataset.
    pub async fn new() -> Result<DBService, DbError> {
        let seed = SeedData::builtin()?;
        Self::new_seeded(&seed).await
    }

    pub async fn new_seeded(seed: &SeedData) -> Result<DBService, DbError> {
        // A single long-lived connection keeps the in-memory database alive.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let mut tx = pool.begin().await?;
        let mut beneficiary_count = 0usize;
        for distribution in &seed.distributions {
            Distribution::insert(&mut *tx, distribution).await?;
            for (position, beneficiary) in distribution
                .beneficiary_list
                .iter()
                .flatten()
                .enumerate()
            {
                Beneficiary::insert(&mut *tx, &distribution.id, position, beneficiary).await?;
                beneficiary_count += 1;
            }
        }
        tx.commit().await?;

        info!(
            distributions = seed.distributions.len(),
            beneficiaries = beneficiary_count,
            "Seeded in-memory distribution store"
        );

        Ok(DBService { pool })
    }
}
