//! Backend for the Sahyadri Maharashtra travel guide.
//!
//! Proxies chat and season explanations to the model gateway and turns
//! model-written itineraries into validated day plans with geocoded stops.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod itinerary;
pub mod logging;
pub mod middleware;
pub mod prompts;
pub mod routes;
pub mod services;
