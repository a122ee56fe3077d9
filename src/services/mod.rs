//! Service layer modules for external integrations.
//!
//! Contains the model gateway client, the geocoding client and the waypoint cache.

pub mod cache;
pub mod geocoder;
pub mod model_gateway;

pub use cache::{KeyValueStore, MemoryStore};
pub use geocoder::{Coordinates, Geocoder, NominatimClient};
pub use model_gateway::{GroqClient, ModelGateway};
