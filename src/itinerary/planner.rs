//! One itinerary generation: prompt, repair, validate, geocode.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::sanitizer::sanitize;
use super::validator::validate;
use super::waypoints::WaypointResolver;
use crate::domain::itinerary::{ItineraryDocument, ItineraryResponse};
use crate::error::ApiResult;
use crate::prompts;
use crate::services::ModelGateway;

pub const FORMAT_ERROR_MESSAGE: &str = "The AI generated a plan but we couldn't format it correctly. Please try generating the itinerary again.";
pub const MAP_WARNING: &str = "Could not locate places on the map.";

pub const MAX_DAYS: u32 = 14;
/// Names beyond this many are not geocoded.
pub const MAX_WAYPOINTS: usize = 20;

/// Parameters of one generation request, already normalized.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub city: String,
    pub days: u32,
    pub season: String,
    pub language: String,
}

#[derive(Clone)]
pub struct ItineraryPlanner {
    gateway: Arc<dyn ModelGateway>,
    resolver: WaypointResolver,
    model: String,
}

impl ItineraryPlanner {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        resolver: WaypointResolver,
        model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            model: model.into(),
        }
    }

    pub fn resolver(&self) -> &WaypointResolver {
        &self.resolver
    }

    /// Gateway failures are errors; everything after the model answered is
    /// folded into one of the response states.
    #[instrument(skip(self), fields(city = %trip.city, days = trip.days))]
    pub async fn generate(&self, trip: &TripRequest) -> ApiResult<ItineraryResponse> {
        let messages = prompts::itinerary(&trip.city, trip.days, &trip.season, &trip.language);
        let raw = self.gateway.complete(&self.model, &messages).await?;

        let document = match sanitize(&raw) {
            Ok(reply) => validate(&reply.value).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let plan = match document {
            Ok(ItineraryDocument::Plan(plan)) => plan,
            Ok(ItineraryDocument::Rejected { error }) => {
                info!(error = %error, "Destination rejected by the model");
                return Ok(ItineraryResponse::Rejected { error });
            }
            Err(reason) => {
                warn!(reason = %reason, "Unusable itinerary reply");
                return Ok(ItineraryResponse::FormatError {
                    message: FORMAT_ERROR_MESSAGE.to_string(),
                });
            }
        };

        let mappable = &plan.location_names[..plan.location_names.len().min(MAX_WAYPOINTS)];
        let waypoints = self.resolver.resolve(mappable).await;
        let map_warning = (!plan.location_names.is_empty() && waypoints.is_empty())
            .then(|| MAP_WARNING.to_string());

        Ok(ItineraryResponse::Ok {
            city_name: plan.city_name.clone().unwrap_or_else(|| trip.city.clone()),
            itinerary: plan.ordered_days(),
            location_names: plan.location_names,
            waypoints,
            map_warning,
        })
    }
}
