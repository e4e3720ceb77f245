use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::parse_date;

/// Everything a narrative generator needs to describe one investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeInput {
    pub ticker: String,
    pub company_name: String,
    pub purchase_date: NaiveDate,
    pub amount: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    pub percent_return: f64,
}

impl NarrativeInput {
    pub fn is_positive(&self) -> bool {
        self.gain_loss >= 0.0
    }
}

/// Request body for POST /api/generate-summary. Text fields are optional so
/// that missing ones can be reported as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryRequest {
    pub ticker: Option<String>,
    pub company_name: Option<String>,
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub gain_loss: f64,
    #[serde(default)]
    pub percent_return: f64,
}

impl GenerateSummaryRequest {
    pub fn into_input(self) -> Result<NarrativeInput, AppError> {
        let (Some(ticker), Some(company_name), Some(purchase_date)) = (
            non_blank(self.ticker),
            non_blank(self.company_name),
            non_blank(self.purchase_date),
        ) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        Ok(NarrativeInput {
            ticker: ticker.to_uppercase(),
            company_name,
            purchase_date: parse_date(&purchase_date)?,
            amount: self.amount,
            current_value: self.current_value,
            gain_loss: self.gain_loss,
            percent_return: self.percent_return,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
