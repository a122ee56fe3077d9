//! Itinerary generation: model reply repair, validation and waypoint resolution.

pub mod planner;
pub mod sanitizer;
pub mod validator;
pub mod waypoints;

pub use planner::ItineraryPlanner;
pub use sanitizer::{sanitize, SanitizedReply};
pub use validator::validate;
pub use waypoints::WaypointResolver;
