use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::errors::AppError;

pub const MAX_TICKER_LEN: usize = 10;

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9.\-]+$").expect("ticker pattern is valid"));

/// Exchange symbol, trimmed and uppercased. Only constructed through `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let symbol = raw.trim().to_uppercase();

        if symbol.is_empty() {
            return Err(AppError::Validation("Ticker is required".to_string()));
        }
        if symbol.chars().count() > MAX_TICKER_LEN {
            return Err(AppError::Validation(format!(
                "Ticker must be {} characters or less",
                MAX_TICKER_LEN
            )));
        }
        if !TICKER_PATTERN.is_match(&symbol) {
            return Err(AppError::Validation(
                "Ticker can only contain letters, digits, dots, and hyphens".to_string(),
            ));
        }

        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TickerSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
