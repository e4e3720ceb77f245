use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PriceSeries, TickerSymbol};

/// Normalized result of a price lookup, regardless of provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub ticker: TickerSymbol,
    pub company_name: String,
    pub purchase_date: NaiveDate,
    pub purchase_price: f64,
    pub current_price: f64,
    pub historical_data: PriceSeries,
}

/// Search hit for the ticker lookup box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
}

/// Fallback display name when a provider has no profile for the ticker
pub fn default_company_name(ticker: &TickerSymbol) -> String {
    format!("{} Inc.", ticker)
}
