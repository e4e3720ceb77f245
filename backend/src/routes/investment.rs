use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{InvestmentQuery, InvestmentReport};
use crate::services::investment_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_investment))
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestmentParams {
    pub ticker: Option<String>,
    pub date: Option<String>,
    pub amount: Option<String>,
}

/// GET /api/investment?ticker=AAPL&date=2020-01-15&amount=1000
///
/// Full evaluation: prices, metrics and narrative in one response.
pub async fn get_investment(
    State(state): State<AppState>,
    Query(params): Query<InvestmentParams>,
) -> Result<Json<InvestmentReport>, AppError> {
    info!("GET /api/investment - {:?}", params);

    let query = InvestmentQuery::from_raw(
        params.ticker.as_deref(),
        params.date.as_deref(),
        params.amount.as_deref(),
        Utc::now().date_naive(),
    )?;

    let report = investment_service::evaluate(
        state.price_provider.as_ref(),
        state.narrator.as_ref(),
        state.fallback_narrator.as_ref(),
        &query,
    )
    .await
    .map_err(|e| {
        error!("Failed to evaluate investment in {}: {}", query.ticker, e);
        e
    })?;

    Ok(Json(report))
}
