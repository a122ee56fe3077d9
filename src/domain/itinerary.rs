//! Itinerary documents, day plans and resolved waypoints.

use serde::{Deserialize, Serialize};

/// Placeholder used when the model omits a day's details.
pub const MISSING_DETAILS: &str = "Details not available";

/// One day of a generated plan. `day` values may repeat or skip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayPlan {
    pub day: u32,
    pub details: String,
}

/// Validated model output: either a plan or an out-of-region rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItineraryDocument {
    Plan(ItineraryPlan),
    Rejected { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryPlan {
    pub city_name: Option<String>,
    pub itinerary: Vec<DayPlan>,
    pub location_names: Vec<String>,
}

impl ItineraryPlan {
    /// Days in rendering order. The sort is stable so duplicate days keep the
    /// order the model produced them in.
    pub fn ordered_days(&self) -> Vec<DayPlan> {
        let mut days = self.itinerary.clone();
        days.sort_by_key(|d| d.day);
        days
    }
}

/// A geocoded stop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl GeoPoint {
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

// =============================================================================
// Request/Response DTOs for API endpoints
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryRequest {
    pub city: String,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// What the front-end renders for one generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItineraryResponse {
    Ok {
        city_name: String,
        itinerary: Vec<DayPlan>,
        location_names: Vec<String>,
        waypoints: Vec<GeoPoint>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map_warning: Option<String>,
    },
    Rejected {
        error: String,
    },
    FormatError {
        message: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaypointsRequest {
    pub location_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointsResponse {
    pub waypoints: Vec<GeoPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_days_is_stable_for_duplicates() {
        let plan = ItineraryPlan {
            city_name: None,
            itinerary: vec![
                DayPlan { day: 2, details: "b".into() },
                DayPlan { day: 1, details: "a".into() },
                DayPlan { day: 2, details: "c".into() },
                DayPlan { day: 5, details: "d".into() },
            ],
            location_names: vec![],
        };

        let details: Vec<String> = plan.ordered_days().into_iter().map(|d| d.details).collect();
        assert_eq!(details, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn response_is_tagged_by_status() {
        let body = serde_json::to_value(ItineraryResponse::Rejected {
            error: "outside".into(),
        })
        .unwrap();
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["error"], "outside");
    }
}
