mod investment;
mod narrative;
mod price_point;
mod stock_data;
mod ticker;

pub use investment::{
    parse_date, validate_purchase_date, InvestmentMetrics, InvestmentQuery, InvestmentReport,
    SummarySource,
};
pub use narrative::{GenerateSummaryRequest, NarrativeInput, SummaryResponse};
pub use price_point::{PricePoint, PriceSeries};
pub use stock_data::{default_company_name, StockData, TickerMatch};
pub use ticker::TickerSymbol;
