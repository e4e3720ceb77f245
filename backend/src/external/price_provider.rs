use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{StockData, TickerMatch, TickerSymbol};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

/// Source of historical prices for the "what if" lookup.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Short identifier reported by the status endpoint
    fn name(&self) -> &'static str;

    /// Prices for `ticker` over `[purchase_date, today]`, the purchase and
    /// current price, and the company display name.
    async fn fetch_stock_data(
        &self,
        ticker: &TickerSymbol,
        purchase_date: NaiveDate,
    ) -> Result<StockData, PriceProviderError>;

    async fn search_ticker_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<TickerMatch>, PriceProviderError>;
}
