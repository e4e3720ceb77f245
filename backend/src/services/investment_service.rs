use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{
    InvestmentMetrics, InvestmentQuery, InvestmentReport, NarrativeInput, StockData, SummarySource,
    TickerSymbol,
};
use crate::services::metrics_service;
use crate::services::narrative_service::{brief_summary, NarrativeGenerator};

pub async fn fetch_stock_data(
    provider: &dyn PriceProvider,
    ticker: &TickerSymbol,
    purchase_date: NaiveDate,
) -> Result<StockData, AppError> {
    provider
        .fetch_stock_data(ticker, purchase_date)
        .await
        .map_err(|e| {
            error!("Failed to fetch stock data for {} from {}: {}", ticker, provider.name(), e);
            AppError::from(e)
        })
}

pub fn narrative_input(stock: &StockData, amount: f64, metrics: &InvestmentMetrics) -> NarrativeInput {
    NarrativeInput {
        ticker: stock.ticker.to_string(),
        company_name: stock.company_name.clone(),
        purchase_date: stock.purchase_date,
        amount,
        current_value: metrics.current_value,
        gain_loss: metrics.gain_loss,
        percent_return: metrics.percent_return,
    }
}

/// Runs the configured generator, then the template fallback, then the
/// one-sentence summary. Never fails.
pub async fn summarize(
    narrator: &dyn NarrativeGenerator,
    fallback: &dyn NarrativeGenerator,
    input: &NarrativeInput,
) -> (String, SummarySource) {
    match narrator.generate(input).await {
        Ok(summary) => return (summary, narrator.source()),
        Err(e) => warn!("Narrative generation failed for {}: {}. Falling back", input.ticker, e),
    }

    match fallback.generate(input).await {
        Ok(summary) => (summary, fallback.source()),
        Err(e) => {
            warn!("Fallback narrative failed for {}: {}. Using brief summary", input.ticker, e);
            (brief_summary(input), SummarySource::Brief)
        }
    }
}

/// Price lookup, metrics, narrative. Price and metric failures abort the
/// evaluation; narrative failures degrade.
pub async fn evaluate(
    provider: &dyn PriceProvider,
    narrator: &dyn NarrativeGenerator,
    fallback: &dyn NarrativeGenerator,
    query: &InvestmentQuery,
) -> Result<InvestmentReport, AppError> {
    info!(
        "Evaluating ${} in {} since {} via {}",
        query.amount,
        query.ticker,
        query.purchase_date,
        provider.name()
    );

    let stock = fetch_stock_data(provider, &query.ticker, query.purchase_date).await?;
    let metrics = metrics_service::calculate(query.amount, stock.purchase_price, stock.current_price)?;

    let input = narrative_input(&stock, query.amount, &metrics);
    let (summary, summary_source) = summarize(narrator, fallback, &input).await;

    Ok(InvestmentReport {
        amount: query.amount,
        stock,
        metrics,
        summary,
        summary_source,
    })
}
