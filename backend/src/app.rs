use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, investment, search, status, stock_data, summary};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/status", status::router())
        .nest("/api/stock-data", stock_data::router())
        .nest("/api/generate-summary", summary::router())
        .nest("/api/investment", investment::router())
        .nest("/api/search", search::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
