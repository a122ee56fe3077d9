//! Seasonal planner: static recommendations and a model-written explanation.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::chat::{SeasonExplanationRequest, SeasonExplanationResponse};
use crate::domain::season::{Season, SeasonGuide};
use crate::error::{ApiError, ApiResult};
use crate::middleware::request_id::request_id;
use crate::prompts;

pub const EXPLANATION_FAILED: &str = "Could not generate explanation.";

/// GET /api/seasons/:season
pub async fn season_guide(Path(season): Path<String>) -> ApiResult<Json<SeasonGuide>> {
    let season: Season = season
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown season '{}'", season)))?;

    Ok(Json(season.guide()))
}

/// POST /api/season-explanation
pub async fn explain_season(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeasonExplanationRequest>,
) -> (StatusCode, Json<SeasonExplanationResponse>) {
    let messages = prompts::season_explanation(req.season.trim());

    match state
        .gateway
        .complete(&state.settings.groq_model, &messages)
        .await
    {
        Ok(explanation) => (StatusCode::OK, Json(SeasonExplanationResponse { explanation })),
        Err(e) => {
            tracing::error!(
                error = %e,
                season = %req.season,
                request_id = request_id(&headers),
                "Season explanation failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SeasonExplanationResponse {
                    explanation: EXPLANATION_FAILED.to_string(),
                }),
            )
        }
    }
}
