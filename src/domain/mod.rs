//! Domain models shared by the routes, services and the itinerary pipeline.

pub mod chat;
pub mod itinerary;
pub mod season;
