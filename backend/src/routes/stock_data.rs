use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{parse_date, validate_purchase_date, StockData, TickerSymbol};
use crate::services::investment_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stock_data))
}

#[derive(Debug, Default, Deserialize)]
pub struct StockDataParams {
    pub ticker: Option<String>,
    pub date: Option<String>,
}

/// GET /api/stock-data?ticker=AAPL&date=2020-01-15
pub async fn get_stock_data(
    State(state): State<AppState>,
    Query(params): Query<StockDataParams>,
) -> Result<Json<StockData>, AppError> {
    let (Some(ticker), Some(date)) = (
        params.ticker.filter(|t| !t.trim().is_empty()),
        params.date.filter(|d| !d.trim().is_empty()),
    ) else {
        return Err(AppError::Validation("Ticker and date are required".to_string()));
    };
    info!("GET /api/stock-data - ticker: {}, date: {}", ticker, date);

    let ticker = TickerSymbol::parse(&ticker)?;
    let purchase_date = parse_date(&date)?;
    validate_purchase_date(purchase_date, Utc::now().date_naive())?;

    let data = investment_service::fetch_stock_data(
        state.price_provider.as_ref(),
        &ticker,
        purchase_date,
    )
    .await?;

    Ok(Json(data))
}
