use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;

use super::beneficiary::Beneficiary;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    TS,
    EnumString,
    Display,
    EnumIter,
)]
#[sqlx(type_name = "distribution_status")]
#[ts(export)]
pub enum DistributionStatus {
    Planned,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "aid_type")]
#[ts(export)]
pub enum AidType {
    Food,
    Medical,
    Shelter,
    Water,
    Cash,
    Education,
}

/// How the aid physically or financially reaches beneficiaries
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(type_name = "delivery_channel")]
#[ts(export)]
pub enum DeliveryChannel {
    #[sqlx(rename = "Direct Distribution")]
    #[serde(rename = "Direct Distribution")]
    #[strum(serialize = "Direct Distribution")]
    DirectDistribution,
    Voucher,
    #[sqlx(rename = "Mobile Money")]
    #[serde(rename = "Mobile Money")]
    #[strum(serialize = "Mobile Money")]
    MobileMoney,
    #[sqlx(rename = "Bank Transfer")]
    #[serde(rename = "Bank Transfer")]
    #[strum(serialize = "Bank Transfer")]
    BankTransfer,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Distribution {
    pub id: String,
    pub region: String,
    pub date: NaiveDate,
    pub status: DistributionStatus,
    pub beneficiaries: u32,
    pub aid_type: AidType,
    pub delivery_channel: DeliveryChannel,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub beneficiary_list: Option<Vec<Beneficiary>>,
}

/// Query filters. Unset fields do not constrain the result.
///
/// Empty query-string values (`?region=&status=`) deserialize as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DistributionFilters {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub region: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub status: Option<DistributionStatus>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub aid_type: Option<AidType>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub delivery_channel: Option<DeliveryChannel>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub page: Option<u32>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub limit: Option<u32>,
}

/// Query strings carry every value as text, JSON carries numbers natively
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrValue<T> {
    Text(String),
    Value(T),
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Option::<TextOrValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TextOrValue::Value(value)) => Ok(Some(value)),
        Some(TextOrValue::Text(text)) => match text.trim() {
            "" => Ok(None),
            value => value.parse().map(Some).map_err(de::Error::custom),
        },
    }
}

impl DistributionFilters {
    pub fn with_status(status: DistributionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Default::default()
        }
    }

    /// 1-based page, never below 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// True when every set predicate holds for `distribution`
    pub fn matches(&self, distribution: &Distribution) -> bool {
        self.region
            .as_ref()
            .is_none_or(|region| &distribution.region == region)
            && self.status.is_none_or(|s| distribution.status == s)
            && self.aid_type.is_none_or(|t| distribution.aid_type == t)
            && self
                .delivery_channel
                .is_none_or(|c| distribution.delivery_channel == c)
    }

    /// Overlays the predicates and paging fields that are set in `update`.
    pub fn merge(&mut self, update: DistributionFilters) {
        if update.region.is_some() {
            self.region = update.region;
        }
        if update.status.is_some() {
            self.status = update.status;
        }
        if update.aid_type.is_some() {
            self.aid_type = update.aid_type;
        }
        if update.delivery_channel.is_some() {
            self.delivery_channel = update.delivery_channel;
        }
        if update.page.is_some() {
            self.page = update.page;
        }
        if update.limit.is_some() {
            self.limit = update.limit;
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut separator = " WHERE ";
        if let Some(region) = &self.region {
            qb.push(separator).push("region = ").push_bind(region.clone());
            separator = " AND ";
        }
        if let Some(status) = self.status {
            qb.push(separator).push("status = ").push_bind(status);
            separator = " AND ";
        }
        if let Some(aid_type) = self.aid_type {
            qb.push(separator).push("aid_type = ").push_bind(aid_type);
            separator = " AND ";
        }
        if let Some(channel) = self.delivery_channel {
            qb.push(separator)
                .push("delivery_channel = ")
                .push_bind(channel);
        }
    }
}

const DISTRIBUTION_COLUMNS: &str =
    "SELECT id, region, date, status, beneficiaries, aid_type, delivery_channel FROM distributions";

impl Distribution {
    pub async fn insert<'e, E>(executor: E, distribution: &Distribution) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"INSERT INTO distributions
                (id, region, date, status, beneficiaries, aid_type, delivery_channel)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&distribution.id)
        .bind(&distribution.region)
        .bind(distribution.date)
        .bind(distribution.status)
        .bind(distribution.beneficiaries)
        .bind(distribution.aid_type)
        .bind(distribution.delivery_channel)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Returns the requested page of matching records (seed order) and the
    /// number of matches before paging.
    pub async fn find_filtered(
        pool: &SqlitePool,
        filters: &DistributionFilters,
    ) -> Result<(Vec<Self>, u64), sqlx::Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM distributions");
        filters.push_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(DISTRIBUTION_COLUMNS);
        filters.push_where(&mut select);
        select
            .push(" ORDER BY rowid LIMIT ")
            .push_bind(i64::from(filters.limit()))
            .push(" OFFSET ")
            .push_bind(filters.offset() as i64);

        let mut distributions = select.build_query_as::<Self>().fetch_all(pool).await?;
        for distribution in &mut distributions {
            distribution.load_beneficiaries(pool).await?;
        }

        Ok((distributions, total as u64))
    }

    /// Every record in seed order, beneficiary lists included
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let mut distributions: Vec<Self> =
            sqlx::query_as(&format!("{DISTRIBUTION_COLUMNS} ORDER BY rowid"))
                .fetch_all(pool)
                .await?;
        for distribution in &mut distributions {
            distribution.load_beneficiaries(pool).await?;
        }
        Ok(distributions)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let found: Option<Self> = sqlx::query_as(&format!("{DISTRIBUTION_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match found {
            Some(mut distribution) => {
                distribution.load_beneficiaries(pool).await?;
                Ok(Some(distribution))
            }
            None => Ok(None),
        }
    }

    pub async fn count(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM distributions")
            .fetch_one(pool)
            .await?;
        Ok(count as u64)
    }

    async fn load_beneficiaries(&mut self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let list = Beneficiary::find_by_distribution_id(pool, &self.id).await?;
        self.beneficiary_list = (!list.is_empty()).then_some(list);
        Ok(())
    }
}
