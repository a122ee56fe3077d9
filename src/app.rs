use anyhow::Result;
use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::itinerary::{ItineraryPlanner, WaypointResolver};
use crate::middleware::request_id_layer;
use crate::routes;
use crate::services::{GroqClient, KeyValueStore, MemoryStore, ModelGateway, NominatimClient};

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub gateway: Arc<dyn ModelGateway>,
    pub planner: ItineraryPlanner,
}

impl AppState {
    pub fn new(
        settings: Settings,
        gateway: Arc<dyn ModelGateway>,
        resolver: WaypointResolver,
    ) -> Arc<Self> {
        let planner = ItineraryPlanner::new(gateway.clone(), resolver, settings.groq_model.clone());
        Arc::new(Self {
            settings,
            gateway,
            planner,
        })
    }

    /// Wire the production clients: Groq, Nominatim and an in-memory geo cache.
    pub fn from_settings(settings: Settings) -> Result<Arc<Self>> {
        let gateway = GroqClient::new(
            &settings.groq_base_url,
            &settings.groq_api_key,
            settings.model_timeout_seconds,
            settings.model_retry_max_elapsed_seconds,
        )?;

        let geocoder = NominatimClient::new(
            &settings.geocoder_url,
            &settings.geocoder_user_agent,
            settings.geocode_timeout(),
        )?;

        let cache: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let resolver = WaypointResolver::new(
            Arc::new(geocoder),
            cache,
            settings.geocoder_region.clone(),
            settings.geocode_stagger(),
            settings.geocode_timeout(),
        );

        Ok(Self::new(settings, Arc::new(gateway), resolver))
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // Spans at DEBUG to keep INFO quiet
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let (set_request_id, propagate_request_id) = request_id_layer();

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    let layer = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .max_age(max_age);

    // The static front-end may be opened from any origin unless restricted.
    if settings.cors_allow_origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    layer.allow_origin(origins)
}
