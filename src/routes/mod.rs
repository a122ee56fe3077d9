pub mod chat;
pub mod health;
pub mod itinerary;
pub mod season;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health_check))
        // Conversation
        .route("/chat", post(chat::chat))
        // Seasonal planner
        .route("/api/season-explanation", post(season::explain_season))
        .route("/api/seasons/:season", get(season::season_guide))
        // Itinerary generator
        .route("/api/itinerary", post(itinerary::generate_itinerary))
        .route("/api/waypoints", post(itinerary::resolve_waypoints))
}
