use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{
    default_company_name, PricePoint, PriceSeries, StockData, TickerMatch, TickerSymbol,
};

const KNOWN_COMPANIES: [(&str, &str); 8] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("NFLX", "Netflix, Inc."),
];

const MAX_POINTS: usize = 60;
const MIN_PRICE: f64 = 0.01;
const MS_PER_DAY: f64 = 86_400_000.0;

pub fn company_name_for(ticker: &TickerSymbol) -> String {
    KNOWN_COMPANIES
        .iter()
        .find(|(symbol, _)| *symbol == ticker.as_str())
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| default_company_name(ticker))
}

/// Mock lookup: a random purchase price, a current price grown by a random
/// annual rate, and a jittered straight line between them sampled roughly
/// once a month.
pub fn generate_stock_data<R: Rng>(
    rng: &mut R,
    ticker: &TickerSymbol,
    purchase_date: NaiveDate,
    now: DateTime<Utc>,
) -> StockData {
    let start = purchase_date.and_time(NaiveTime::MIN).and_utc();
    let elapsed_ms = (now - start).num_milliseconds().max(0) as f64;
    let elapsed_years = elapsed_ms / (365.0 * MS_PER_DAY);
    let elapsed_months = elapsed_ms / (30.0 * MS_PER_DAY);

    let purchase_price: f64 = rng.random_range(10.0..500.0);
    let annual_growth: f64 = rng.random_range(0.05..0.25);
    let current_price = purchase_price * (1.0 + annual_growth * elapsed_years);

    // Always at least two points so the series spans the whole window
    let count = (elapsed_months.floor() as usize).clamp(1, MAX_POINTS).max(2);
    let last = (count - 1) as f64;

    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let fraction = i as f64 / last;
        let at = if i + 1 == count {
            now.max(start)
        } else {
            start + Duration::milliseconds((elapsed_ms * fraction) as i64)
        };

        let expected = purchase_price + (current_price - purchase_price) * fraction;
        let jitter: f64 = rng.random_range(0.95..=1.05);
        points.push(PricePoint::new(at.date_naive(), (expected * jitter).max(MIN_PRICE)));
    }
    points.dedup_by_key(|p| p.date);

    let historical_data = PriceSeries::new(points).unwrap_or_else(|e| {
        warn!("Synthetic series for {} collapsed ({}), using a single point", ticker, e);
        PriceSeries::single(PricePoint::new(purchase_date, purchase_price))
    });

    StockData {
        ticker: ticker.clone(),
        company_name: company_name_for(ticker),
        purchase_date,
        purchase_price,
        current_price,
        historical_data,
    }
}

/// Provider used when no FMP key is configured. Never fails.
pub struct SyntheticProvider {
    rng: Mutex<StdRng>,
}

impl SyntheticProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng: Mutex::new(rng) }
    }
}

#[async_trait]
impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch_stock_data(
        &self,
        ticker: &TickerSymbol,
        purchase_date: NaiveDate,
    ) -> Result<StockData, PriceProviderError> {
        let data = {
            let mut rng = self.rng.lock();
            generate_stock_data(&mut *rng, ticker, purchase_date, Utc::now())
        };

        info!(
            "Generated {} synthetic prices for {} since {}",
            data.historical_data.len(),
            ticker,
            purchase_date
        );
        Ok(data)
    }

    async fn search_ticker_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<TickerMatch>, PriceProviderError> {
        let needle = keyword.trim().to_lowercase();

        Ok(KNOWN_COMPANIES
            .iter()
            .filter(|(symbol, name)| {
                symbol.to_lowercase().contains(&needle) || name.to_lowercase().contains(&needle)
            })
            .map(|(symbol, name)| TickerMatch {
                symbol: symbol.to_string(),
                name: name.to_string(),
                exchange: Some("NASDAQ".to_string()),
            })
            .collect())
    }
}
