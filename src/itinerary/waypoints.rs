//! Place names to map waypoints.
//!
//! Cached names resolve immediately. Misses are geocoded concurrently, but the
//! request for the name at input position `i` waits `stagger * i` before it is
//! sent so the shared geocoder sees a bounded request rate. Every branch is
//! joined; a failed, empty or timed-out lookup only drops that one stop.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::itinerary::GeoPoint;
use crate::services::cache::{self, keys, KeyValueStore};
use crate::services::geocoder::Geocoder;

#[derive(Clone)]
pub struct WaypointResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<dyn KeyValueStore>,
    region: String,
    stagger: Duration,
    call_timeout: Duration,
}

impl WaypointResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<dyn KeyValueStore>,
        region: impl Into<String>,
        stagger: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            cache,
            region: region.into(),
            stagger,
            call_timeout,
        }
    }

    /// Resolve names to points, preserving input order and dropping misses.
    ///
    /// Repeated names are looked up once and reported at each position.
    #[instrument(skip(self, names), fields(requested = names.len()))]
    pub async fn resolve(&self, names: &[String]) -> Vec<GeoPoint> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (position, name) in names.iter().enumerate() {
            first_seen.entry(name.as_str()).or_insert(position);
        }

        let mut unique: Vec<(&str, usize)> = first_seen.into_iter().collect();
        unique.sort_by_key(|&(_, position)| position);

        let lookups = unique
            .iter()
            .map(|&(name, position)| self.resolve_one(name, position));
        let results = join_all(lookups).await;

        let resolved: HashMap<&str, GeoPoint> = unique
            .iter()
            .zip(results)
            .filter_map(|(&(name, _), point)| point.map(|p| (name, p)))
            .collect();

        let points: Vec<GeoPoint> = names
            .iter()
            .filter_map(|name| resolved.get(name.as_str()).cloned())
            .collect();

        debug!(resolved = points.len(), "Waypoints resolved");
        points
    }

    async fn resolve_one(&self, name: &str, position: usize) -> Option<GeoPoint> {
        let key = keys::geo(name);
        if let Some(point) = cache::get_json::<GeoPoint>(self.cache.as_ref(), &key) {
            return Some(point);
        }

        let delay = self.stagger * position as u32;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let point = match tokio::time::timeout(self.call_timeout, self.geocode(name)).await {
            Ok(point) => point?,
            Err(_) => {
                warn!(place = name, "Geocoding timed out");
                return None;
            }
        };

        cache::set_json(self.cache.as_ref(), &key, &point);
        Some(point)
    }

    /// Region-qualified query first, then the bare name once.
    async fn geocode(&self, name: &str) -> Option<GeoPoint> {
        let qualified = format!("{}, {}", name, self.region);

        for query in [qualified.as_str(), name] {
            match self.geocoder.search(query).await {
                Ok(Some(coords)) => {
                    let point = GeoPoint {
                        lat: coords.lat,
                        lng: coords.lng,
                        name: name.to_string(),
                    };
                    if point.is_in_range() {
                        return Some(point);
                    }
                    warn!(place = name, lat = coords.lat, lng = coords.lng, "Geocoder returned out-of-range coordinates");
                    return None;
                }
                Ok(None) => debug!(query = query, "No geocoding match"),
                Err(e) => {
                    warn!(place = name, error = %e, "Failed to geocode");
                    return None;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryStore;
    use crate::services::geocoder::Coordinates;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tokio::time::Instant;

    /// Answers from a fixed table and records every query with its send time.
    struct TableGeocoder {
        table: HashMap<String, Coordinates>,
        calls: Mutex<Vec<(String, Instant)>>,
        hang_on: Option<String>,
    }

    impl TableGeocoder {
        fn new(entries: &[(&str, f64, f64)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|&(q, lat, lng)| (q.to_string(), Coordinates { lat, lng }))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                hang_on: None,
            }
        }

        fn queries(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(q, _)| q.clone()).collect()
        }
    }

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn search(&self, query: &str) -> anyhow::Result<Option<Coordinates>> {
            self.calls.lock().push((query.to_string(), Instant::now()));
            if self.hang_on.as_deref() == Some(query) {
                std::future::pending::<()>().await;
            }
            if query.starts_with("Broken") {
                anyhow::bail!("connection reset");
            }
            Ok(self.table.get(query).copied())
        }
    }

    fn resolver(geocoder: Arc<TableGeocoder>, store: Arc<MemoryStore>) -> WaypointResolver {
        WaypointResolver::new(
            geocoder,
            store,
            "Maharashtra, India",
            Duration::from_millis(600),
            Duration::from_secs(10),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_makes_no_calls() {
        let geocoder = Arc::new(TableGeocoder::new(&[]));
        let points = resolver(geocoder.clone(), Arc::new(MemoryStore::new()))
            .resolve(&[])
            .await;

        assert!(points.is_empty());
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn partial_coverage_keeps_relative_order() {
        let geocoder = Arc::new(TableGeocoder::new(&[
            ("Shaniwar Wada, Maharashtra, India", 18.519, 73.855),
            ("Aga Khan Palace, Maharashtra, India", 18.552, 73.901),
            ("Sinhagad Fort, Maharashtra, India", 18.366, 73.755),
            ("Dagdusheth Temple", 18.516, 73.856),
        ]));
        let input = names(&[
            "Shaniwar Wada",
            "Nowhere Lane",
            "Aga Khan Palace",
            "Dagdusheth Temple",
            "Broken Bridge",
            "Sinhagad Fort",
        ]);

        let points = resolver(geocoder.clone(), Arc::new(MemoryStore::new()))
            .resolve(&input)
            .await;

        let resolved: Vec<&str> = points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            resolved,
            vec!["Shaniwar Wada", "Aga Khan Palace", "Dagdusheth Temple", "Sinhagad Fort"]
        );
        // Unqualified retry only after a qualified miss
        let queries = geocoder.queries();
        assert!(queries.contains(&"Dagdusheth Temple".to_string()));
        assert!(queries.contains(&"Nowhere Lane".to_string()));
        assert!(!queries.contains(&"Shaniwar Wada".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn second_resolution_is_served_from_cache() {
        let geocoder = Arc::new(TableGeocoder::new(&[
            ("Lonavala, Maharashtra, India", 18.75, 73.40),
            ("Khandala, Maharashtra, India", 18.76, 73.37),
        ]));
        let store = Arc::new(MemoryStore::new());
        let resolver = resolver(geocoder.clone(), store.clone());
        let input = names(&["Lonavala", "Khandala"]);

        let first = resolver.resolve(&input).await;
        let calls_after_first = geocoder.queries().len();
        let second = resolver.resolve(&input).await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(geocoder.queries().len(), calls_after_first);
        assert!(store.get("geo:Lonavala").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_staggered_by_input_position() {
        let geocoder = Arc::new(TableGeocoder::new(&[
            ("Ajanta Caves, Maharashtra, India", 20.55, 75.70),
            ("Ellora Caves, Maharashtra, India", 20.02, 75.18),
            ("Bibi Ka Maqbara, Maharashtra, India", 19.90, 75.32),
        ]));
        let start = Instant::now();

        resolver(geocoder.clone(), Arc::new(MemoryStore::new()))
            .resolve(&names(&["Ajanta Caves", "Ellora Caves", "Bibi Ka Maqbara"]))
            .await;

        let offsets: Vec<u128> = geocoder
            .calls
            .lock()
            .iter()
            .map(|(_, at)| at.duration_since(start).as_millis())
            .collect();
        assert_eq!(offsets, vec![0, 600, 1200]);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_lookup_times_out_without_failing_siblings() {
        let mut table = TableGeocoder::new(&[("Tarkarli, Maharashtra, India", 16.03, 73.48)]);
        table.hang_on = Some("Devbagh, Maharashtra, India".to_string());
        let geocoder = Arc::new(table);

        let points = resolver(geocoder, Arc::new(MemoryStore::new()))
            .resolve(&names(&["Devbagh", "Tarkarli"]))
            .await;

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Tarkarli");
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_names_are_looked_up_once() {
        let geocoder = Arc::new(TableGeocoder::new(&[("Pune, Maharashtra, India", 18.52, 73.85)]));

        let points = resolver(geocoder.clone(), Arc::new(MemoryStore::new()))
            .resolve(&names(&["Pune", "Pune"]))
            .await;

        assert_eq!(points.len(), 2);
        assert_eq!(geocoder.queries(), vec!["Pune, Maharashtra, India"]);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_coordinates_are_dropped() {
        let geocoder = Arc::new(TableGeocoder::new(&[("Atlantis, Maharashtra, India", 123.0, 73.0)]));

        let points = resolver(geocoder, Arc::new(MemoryStore::new()))
            .resolve(&names(&["Atlantis"]))
            .await;

        assert!(points.is_empty());
    }
}
