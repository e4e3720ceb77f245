use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{StockData, TickerSymbol};

/// Validated "what if I bought" request
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentQuery {
    pub ticker: TickerSymbol,
    pub purchase_date: NaiveDate,
    pub amount: f64,
}

impl InvestmentQuery {
    pub fn new(
        ticker: TickerSymbol,
        purchase_date: NaiveDate,
        amount: f64,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        validate_purchase_date(purchase_date, today)?;
        validate_amount(amount)?;
        Ok(Self { ticker, purchase_date, amount })
    }

    /// Builds a query from raw request values; every field is required.
    pub fn from_raw(
        ticker: Option<&str>,
        date: Option<&str>,
        amount: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let ticker = TickerSymbol::parse(ticker.unwrap_or_default())?;
        let purchase_date = parse_date(date.unwrap_or_default())?;
        let amount = parse_amount(amount.unwrap_or_default())?;
        Self::new(ticker, purchase_date, amount, today)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("Please select a date".to_string()));
    }
    let invalid = || AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw));

    if raw.len() <= 10 {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid());
    }

    // Full ISO timestamps keep only their calendar date
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .map_err(|_| invalid())
}

pub fn validate_purchase_date(purchase_date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if purchase_date >= today {
        return Err(AppError::Validation("date must be in the past".to_string()));
    }
    Ok(())
}

fn parse_amount(raw: &str) -> Result<f64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("Amount is required".to_string()));
    }
    let amount = raw
        .parse::<f64>()
        .map_err(|_| AppError::Validation("Amount must be a positive number".to_string()))?;
    validate_amount(amount)?;
    Ok(amount)
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation("Amount must be a positive number".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetrics {
    pub shares_purchased: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    pub percent_return: f64,
    pub is_positive: bool,
}

/// Which narrative path produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Llm,
    Template,
    Brief,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReport {
    pub amount: f64,
    #[serde(flatten)]
    pub stock: StockData,
    pub metrics: InvestmentMetrics,
    pub summary: String,
    pub summary_source: SummarySource,
}
