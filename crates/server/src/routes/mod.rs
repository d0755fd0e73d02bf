use axum::Router;

use crate::AppState;

pub mod distributions;

pub fn router() -> Router<AppState> {
    Router::new().merge(distributions::router())
}
