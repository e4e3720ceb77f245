use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{GenerateSummaryRequest, SummaryResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generate_summary))
}

/// POST /api/generate-summary
pub async fn generate_summary(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let input = request.into_input()?;
    info!("POST /api/generate-summary - ticker: {}", input.ticker);

    let summary = state.narrator.generate(&input).await.map_err(|e| {
        error!("Failed to generate summary for {}: {}", input.ticker, e);
        e
    })?;

    Ok(Json(SummaryResponse { summary }))
}
