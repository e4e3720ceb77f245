pub(crate) mod health;
pub(crate) mod investment;
pub(crate) mod search;
pub(crate) mod status;
pub(crate) mod stock_data;
pub(crate) mod summary;
