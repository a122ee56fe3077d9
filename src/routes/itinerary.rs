//! Itinerary generation and waypoint resolution for the map view.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::itinerary::{
    ItineraryRequest, ItineraryResponse, WaypointsRequest, WaypointsResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::itinerary::planner::{TripRequest, MAX_DAYS, MAX_WAYPOINTS};

/// POST /api/itinerary
///
/// Rejections and unusable model output are normal responses; only an
/// unreachable model gateway is an error.
pub async fn generate_itinerary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ItineraryRequest>,
) -> ApiResult<Json<ItineraryResponse>> {
    let city = req.city.trim();
    if city.is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter a destination city".to_string(),
        ));
    }

    let trip = TripRequest {
        city: city.to_string(),
        days: req.days.unwrap_or(1).clamp(1, MAX_DAYS),
        season: non_blank(req.season, "any"),
        language: non_blank(req.language, "English"),
    };

    let response = state.planner.generate(&trip).await?;
    Ok(Json(response))
}

/// POST /api/waypoints
///
/// Only the first `MAX_WAYPOINTS` names are resolved.
pub async fn resolve_waypoints(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<WaypointsRequest>,
) -> Json<WaypointsResponse> {
    if req.location_names.len() > MAX_WAYPOINTS {
        tracing::debug!(
            requested = req.location_names.len(),
            "Truncating waypoint request"
        );
        req.location_names.truncate(MAX_WAYPOINTS);
    }
    let waypoints = state.planner.resolver().resolve(&req.location_names).await;
    Json(WaypointsResponse { waypoints })
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
