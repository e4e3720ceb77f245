use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{
    default_company_name, PricePoint, PriceSeries, StockData, TickerMatch, TickerSymbol,
};

pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const SEARCH_LIMIT: &str = "10";

/// Financial Modeling Prep client (historical closes, company profile, search).
pub struct FmpProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FmpProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| FMP_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PriceProviderError> {
        let url = format!("{}/{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(PriceProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceProviderError::Status(status.as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FmpHistoricalResponse {
    historical: Option<Vec<FmpHistoricalBar>>,

    // Invalid keys and unknown endpoints come back as 200 with:
    // { "Error Message": "Invalid API KEY. ..." }
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FmpHistoricalBar {
    date: String,
    close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FmpProfile {
    #[serde(rename = "companyName")]
    company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FmpSearchHit {
    symbol: String,
    name: Option<String>,
    #[serde(rename = "exchangeShortName")]
    exchange_short_name: Option<String>,
}

/// Turns the two FMP payloads into a normalized lookup result.
fn assemble_stock_data(
    ticker: &TickerSymbol,
    purchase_date: NaiveDate,
    historical: FmpHistoricalResponse,
    profile: Vec<FmpProfile>,
) -> Result<StockData, PriceProviderError> {
    if let Some(msg) = historical.error_message {
        return Err(PriceProviderError::BadResponse(msg));
    }

    let bars = historical
        .historical
        .ok_or_else(|| PriceProviderError::BadResponse("missing historical prices".into()))?;

    let mut points = Vec::with_capacity(bars.len());
    for bar in bars {
        let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d")
            .map_err(|e| PriceProviderError::Parse(format!("{}: {}", bar.date, e)))?;

        match bar.close {
            Some(close) if close.is_finite() && close > 0.0 => points.push(PricePoint::new(date, close)),
            _ => debug!("Skipping {} bar on {} without a usable close", ticker, date),
        }
    }

    // FMP returns newest first
    let series = PriceSeries::from_unordered(points)
        .map_err(|e| PriceProviderError::BadResponse(format!("{} for {}", e, ticker)))?;

    let purchase_price = series.closest_to(purchase_date).price;
    let current_price = series.last().price;

    let company_name = profile
        .into_iter()
        .next()
        .and_then(|p| p.company_name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_company_name(ticker));

    Ok(StockData {
        ticker: ticker.clone(),
        company_name,
        purchase_date,
        purchase_price,
        current_price,
        historical_data: series,
    })
}

#[async_trait]
impl PriceProvider for FmpProvider {
    fn name(&self) -> &'static str {
        "fmp"
    }

    async fn fetch_stock_data(
        &self,
        ticker: &TickerSymbol,
        purchase_date: NaiveDate,
    ) -> Result<StockData, PriceProviderError> {
        let from = purchase_date.format("%Y-%m-%d").to_string();
        let to = Utc::now().date_naive().format("%Y-%m-%d").to_string();

        let historical: FmpHistoricalResponse = self
            .get_json(
                &format!("historical-price-full/{}", ticker),
                &[("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;

        let profile: Vec<FmpProfile> = self
            .get_json(&format!("profile/{}", ticker), &[])
            .await?;

        let data = assemble_stock_data(ticker, purchase_date, historical, profile)?;
        info!(
            "Fetched {} FMP closes for {} ({} → {})",
            data.historical_data.len(),
            ticker,
            data.historical_data.first().date,
            data.historical_data.last().date
        );
        Ok(data)
    }

    async fn search_ticker_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<TickerMatch>, PriceProviderError> {
        let hits: Vec<FmpSearchHit> = self
            .get_json("search", &[("query", keyword), ("limit", SEARCH_LIMIT)])
            .await?;

        Ok(hits
            .into_iter()
            .map(|hit| TickerMatch {
                name: hit.name.unwrap_or_else(|| hit.symbol.clone()),
                symbol: hit.symbol,
                exchange: hit.exchange_short_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn historical(json: serde_json::Value) -> FmpHistoricalResponse {
        serde_json::from_value(json).unwrap()
    }

    fn profile(json: serde_json::Value) -> Vec<FmpProfile> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_assemble_sorts_and_picks_prices() {
        let ticker = TickerSymbol::parse("AAPL").unwrap();
        let data = assemble_stock_data(
            &ticker,
            d(2024, 1, 6),
            historical(serde_json::json!({
                "symbol": "AAPL",
                "historical": [
                    { "date": "2024-03-01", "close": 179.66, "open": 179.55 },
                    { "date": "2024-01-08", "close": 185.56 },
                    { "date": "2024-01-05", "close": 181.18 }
                ]
            })),
            profile(serde_json::json!([{ "companyName": "Apple Inc.", "sector": "Technology" }])),
        )
        .unwrap();

        assert_eq!(data.company_name, "Apple Inc.");
        assert_eq!(data.historical_data.first().date, d(2024, 1, 5));
        assert_eq!(data.purchase_price, 181.18);
        assert_eq!(data.current_price, 179.66);
    }

    #[test]
    fn test_assemble_tie_goes_to_earlier_close() {
        let ticker = TickerSymbol::parse("MSFT").unwrap();
        let data = assemble_stock_data(
            &ticker,
            d(2024, 1, 7),
            historical(serde_json::json!({
                "historical": [
                    { "date": "2024-01-08", "close": 20.0 },
                    { "date": "2024-01-06", "close": 10.0 }
                ]
            })),
            vec![],
        )
        .unwrap();

        assert_eq!(data.purchase_price, 10.0);
        assert_eq!(data.company_name, "MSFT Inc.");
    }

    #[test]
    fn test_assemble_missing_historical_is_bad_response() {
        let ticker = TickerSymbol::parse("ZZZZ").unwrap();
        let result = assemble_stock_data(&ticker, d(2024, 1, 1), historical(serde_json::json!({})), vec![]);
        assert!(matches!(result, Err(PriceProviderError::BadResponse(_))));
    }

    #[test]
    fn test_assemble_empty_historical_is_bad_response() {
        let ticker = TickerSymbol::parse("ZZZZ").unwrap();
        let result = assemble_stock_data(
            &ticker,
            d(2024, 1, 1),
            historical(serde_json::json!({ "historical": [{ "date": "2024-01-02", "close": null }] })),
            vec![],
        );
        assert!(matches!(result, Err(PriceProviderError::BadResponse(_))));
    }

    #[test]
    fn test_assemble_error_message_is_bad_response() {
        let ticker = TickerSymbol::parse("AAPL").unwrap();
        let result = assemble_stock_data(
            &ticker,
            d(2024, 1, 1),
            historical(serde_json::json!({ "Error Message": "Invalid API KEY." })),
            vec![],
        );
        match result {
            Err(PriceProviderError::BadResponse(msg)) => assert_eq!(msg, "Invalid API KEY."),
            other => panic!("unexpected result: {:?}", other.map(|d| d.ticker)),
        }
    }

    #[test]
    fn test_assemble_bad_date_is_parse_error() {
        let ticker = TickerSymbol::parse("AAPL").unwrap();
        let result = assemble_stock_data(
            &ticker,
            d(2024, 1, 1),
            historical(serde_json::json!({ "historical": [{ "date": "01/02/2024", "close": 1.0 }] })),
            vec![],
        );
        assert!(matches!(result, Err(PriceProviderError::Parse(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = FmpProvider::new("key".into(), Some("http://localhost:9000/api/".into()));
        assert_eq!(provider.base_url, "http://localhost:9000/api");
        assert_eq!(provider.name(), "fmp");
    }

    mod http {
        use axum::http::StatusCode;
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::{json, Value};
        use tokio::net::TcpListener;

        use super::*;
        use crate::errors::AppError;

        type Reply = (StatusCode, Value);

        fn ok_history() -> Reply {
            (
                StatusCode::OK,
                json!({
                    "symbol": "AAPL",
                    "historical": [
                        { "date": "2024-03-01", "close": 179.66 },
                        { "date": "2024-01-05", "close": 181.18 }
                    ]
                }),
            )
        }

        fn ok_profile() -> Reply {
            (StatusCode::OK, json!([{ "companyName": "Apple Inc." }]))
        }

        fn reply(status: StatusCode) -> Reply {
            (status, json!({ "message": "unavailable" }))
        }

        async fn serve(router: Router) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });
            format!("http://{}", addr)
        }

        async fn fmp_server(historical: Reply, profile: Reply) -> FmpProvider {
            let router = Router::new()
                .route(
                    "/historical-price-full/:ticker",
                    get(move || {
                        let (status, body) = historical.clone();
                        async move { (status, Json(body)) }
                    }),
                )
                .route(
                    "/profile/:ticker",
                    get(move || {
                        let (status, body) = profile.clone();
                        async move { (status, Json(body)) }
                    }),
                )
                .route(
                    "/search",
                    get(|| async {
                        Json(json!([
                            { "symbol": "AAPL", "name": "Apple Inc.", "exchangeShortName": "NASDAQ" },
                            { "symbol": "APLE" }
                        ]))
                    }),
                );

            FmpProvider::new("test-key".into(), Some(serve(router).await))
        }

        async fn fetch(provider: &FmpProvider) -> Result<StockData, PriceProviderError> {
            let ticker = TickerSymbol::parse("AAPL").unwrap();
            provider.fetch_stock_data(&ticker, d(2024, 1, 6)).await
        }

        #[tokio::test]
        async fn test_fetch_assembles_both_payloads() {
            let provider = fmp_server(ok_history(), ok_profile()).await;
            let data = fetch(&provider).await.unwrap();

            assert_eq!(data.company_name, "Apple Inc.");
            assert_eq!(data.purchase_price, 181.18);
            assert_eq!(data.current_price, 179.66);
        }

        #[tokio::test]
        async fn test_historical_server_error_is_upstream_unavailable() {
            let provider = fmp_server(reply(StatusCode::SERVICE_UNAVAILABLE), ok_profile()).await;
            let err = fetch(&provider).await.unwrap_err();

            assert!(matches!(err, PriceProviderError::Status(503)));
            assert!(matches!(AppError::from(err), AppError::UpstreamUnavailable(_)));
        }

        #[tokio::test]
        async fn test_profile_failure_after_historical_is_upstream_unavailable() {
            let provider = fmp_server(ok_history(), reply(StatusCode::BAD_GATEWAY)).await;
            let err = fetch(&provider).await.unwrap_err();

            assert!(matches!(err, PriceProviderError::Status(502)));
            assert!(matches!(AppError::from(err), AppError::UpstreamUnavailable(_)));
        }

        #[tokio::test]
        async fn test_rate_limits_are_upstream_unavailable() {
            let provider = fmp_server(reply(StatusCode::TOO_MANY_REQUESTS), ok_profile()).await;
            let err = fetch(&provider).await.unwrap_err();
            assert!(matches!(err, PriceProviderError::RateLimited));
            assert!(matches!(AppError::from(err), AppError::UpstreamUnavailable(_)));

            let provider = fmp_server(ok_history(), reply(StatusCode::TOO_MANY_REQUESTS)).await;
            let err = fetch(&provider).await.unwrap_err();
            assert!(matches!(err, PriceProviderError::RateLimited));
        }

        #[tokio::test]
        async fn test_error_message_body_is_malformed_response() {
            let history = (StatusCode::OK, json!({ "Error Message": "Invalid API KEY." }));
            let provider = fmp_server(history, ok_profile()).await;
            let err = fetch(&provider).await.unwrap_err();

            assert!(matches!(err, PriceProviderError::BadResponse(_)));
            assert!(matches!(AppError::from(err), AppError::MalformedResponse(_)));
        }

        #[tokio::test]
        async fn test_unexpected_shape_is_malformed_response() {
            let history = (StatusCode::OK, json!("maintenance window"));
            let provider = fmp_server(history, ok_profile()).await;
            let err = fetch(&provider).await.unwrap_err();

            assert!(matches!(err, PriceProviderError::Parse(_)));
            assert!(matches!(AppError::from(err), AppError::MalformedResponse(_)));
        }

        #[tokio::test]
        async fn test_unreachable_server_is_upstream_unavailable() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let provider = FmpProvider::new("test-key".into(), Some(format!("http://{}", addr)));
            let err = fetch(&provider).await.unwrap_err();
            assert!(matches!(err, PriceProviderError::Network(_)));
            assert!(matches!(AppError::from(err), AppError::UpstreamUnavailable(_)));
        }

        #[tokio::test]
        async fn test_search_maps_hits() {
            let provider = fmp_server(ok_history(), ok_profile()).await;
            let hits = provider.search_ticker_by_keyword("apple").await.unwrap();

            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].exchange.as_deref(), Some("NASDAQ"));
            assert_eq!(hits[1].name, "APLE");
            assert!(hits[1].exchange.is_none());
        }
    }
}
