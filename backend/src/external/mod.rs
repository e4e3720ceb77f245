pub mod fmp;
pub mod price_provider;
pub mod synthetic;
