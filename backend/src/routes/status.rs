use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::models::SummarySource;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_status))
}

/// Which providers are live and which are running on fallbacks
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub price_provider: &'static str,
    pub narrative_provider: SummarySource,
    pub fmp_configured: bool,
    pub openai_configured: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    info!("GET /api/status - Provider status");
    Json(StatusResponse {
        price_provider: state.price_provider.name(),
        narrative_provider: state.narrator.source(),
        fmp_configured: state.fmp_configured,
        openai_configured: state.openai_configured,
    })
}
