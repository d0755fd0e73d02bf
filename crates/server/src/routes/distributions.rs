//! Read-only distribution endpoints.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::distribution::{Distribution, DistributionFilters};
use tracing::debug;
use utils::response::{ApiResponse, PaginatedResponse};

use crate::{AppState, error::ApiError};

/// GET /api/distributions?region=&status=&aidType=&deliveryChannel=&page=&limit=
pub async fn list_distributions(
    State(state): State<AppState>,
    query: Result<Query<DistributionFilters>, QueryRejection>,
) -> Result<ResponseJson<PaginatedResponse<Distribution>>, ApiError> {
    let Query(filters) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (data, total) = Distribution::find_filtered(&state.db().pool, &filters).await?;

    debug!(
        region = ?filters.region,
        status = ?filters.status,
        page = filters.page(),
        limit = filters.limit(),
        total,
        returned = data.len(),
        "Listed distributions"
    );

    Ok(ResponseJson(PaginatedResponse::new(
        data,
        total,
        filters.page(),
        filters.limit(),
    )))
}

/// GET /api/distributions/{id}
pub async fn get_distribution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Distribution>>, ApiError> {
    let distribution = Distribution::find_by_id(&state.db().pool, &id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(distribution)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/distributions",
        Router::new()
            .route("/", get(list_distributions))
            .route("/{id}", get(get_distribution)),
    )
}
