use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use ts_rs::TS;

/// A recipient of aid tied to a distribution. Only `id` and `name` are
/// guaranteed; the richer fields come from survey data when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Beneficiary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub needs: Option<Vec<String>>,
}

#[derive(FromRow)]
struct BeneficiaryRow {
    id: String,
    name: String,
    age: Option<u32>,
    gender: Option<String>,
    needs: Option<String>, // JSON array
}

impl From<BeneficiaryRow> for Beneficiary {
    fn from(row: BeneficiaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
            needs: row
                .needs
                .as_deref()
                .and_then(|json| serde_json::from_str(json).ok()),
        }
    }
}

impl Beneficiary {
    pub async fn insert<'e, E>(
        executor: E,
        distribution_id: &str,
        position: usize,
        beneficiary: &Beneficiary,
    ) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let needs = beneficiary
            .needs
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO beneficiaries (id, distribution_id, position, name, age, gender, needs)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&beneficiary.id)
        .bind(distribution_id)
        .bind(position as i64)
        .bind(&beneficiary.name)
        .bind(beneficiary.age)
        .bind(&beneficiary.gender)
        .bind(needs)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_by_distribution_id(
        pool: &SqlitePool,
        distribution_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows: Vec<BeneficiaryRow> = sqlx::query_as(
            r#"SELECT id, name, age, gender, needs
            FROM beneficiaries
            WHERE distribution_id = $1
            ORDER BY position"#,
        )
        .bind(distribution_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Beneficiary::from).collect())
    }
}
