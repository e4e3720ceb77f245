use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::TickerMatch;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_tickers))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET /api/search?query=apple
pub async fn search_tickers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TickerMatch>>, AppError> {
    let Some(keyword) = params.query.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()) else {
        return Err(AppError::Validation("Query is required".to_string()));
    };
    info!("GET /api/search - query: {}", keyword);

    let matches = state
        .price_provider
        .search_ticker_by_keyword(&keyword)
        .await
        .map_err(|e| {
            error!("Ticker search for '{}' failed: {}", keyword, e);
            AppError::from(e)
        })?;

    Ok(Json(matches))
}
