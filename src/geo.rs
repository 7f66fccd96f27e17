//! Route tracking for the end-of-run summary.
//!
//! The platform layer feeds position fixes in; everything here is pure so
//! the distance math and place labels test natively. No geolocation logic
//! affects gameplay beyond the distance stat.

use serde::{Deserialize, Serialize};

/// Fallback labels when no fix was available
pub const NO_GPS_START: &str = "No GPS at start";
pub const NO_GPS_END: &str = "No GPS at finish";
/// Shown before the first fix arrives
pub const DEFAULT_PLACE: &str = "Pacific Rainforest";

/// A tagged coordinate with its human-readable label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

/// Accumulated route state for the current session
#[derive(Debug, Clone, Default)]
pub struct RouteLog {
    current: Option<(f64, f64)>,
    place: String,
    start: Option<RoutePoint>,
    end: Option<RoutePoint>,
}

impl RouteLog {
    pub fn new() -> Self {
        Self {
            place: DEFAULT_PLACE.to_owned(),
            ..Self::default()
        }
    }

    /// Feed a position fix. Returns the distance in km from the previous
    /// fix, zero for the first one.
    pub fn record_fix(&mut self, lat: f64, lng: f64) -> f64 {
        let delta = match self.current {
            Some((prev_lat, prev_lng)) => haversine_km(prev_lat, prev_lng, lat, lng),
            None => 0.0,
        };
        self.current = Some((lat, lng));
        self.place = place_label(lat, lng);
        delta
    }

    /// Pin the start of the route at run start.
    pub fn capture_start(&mut self) {
        self.start = self.current.map(|(lat, lng)| RoutePoint {
            lat,
            lng,
            name: self.place.clone(),
        });
        self.end = None;
    }

    /// Pin the end of the route at game over.
    pub fn capture_end(&mut self) {
        self.end = self.current.map(|(lat, lng)| RoutePoint {
            lat,
            lng,
            name: self.place.clone(),
        });
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn start_label(&self) -> &str {
        self.start.as_ref().map(|p| p.name.as_str()).unwrap_or(NO_GPS_START)
    }

    pub fn end_label(&self) -> &str {
        self.end.as_ref().map(|p| p.name.as_str()).unwrap_or(NO_GPS_END)
    }

    pub fn start(&self) -> Option<&RoutePoint> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&RoutePoint> {
        self.end.as_ref()
    }
}

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Human-readable label for a coordinate, without a reverse-geocoding
/// service: coarse bounding boxes for the regions players actually play in,
/// plus a deterministic forest-flavored prefix.
pub fn place_label(lat: f64, lng: f64) -> String {
    let (region, zone) = if (-55.0..=-21.5).contains(&lat) && (-73.5..=-53.5).contains(&lng) {
        let zone = if (-35.0..=-27.0).contains(&lat) && (-65.0..=-57.0).contains(&lng) {
            "C\u{f3}rdoba Province"
        } else if (-35.0..=-26.0).contains(&lat) && (-70.0..=-62.0).contains(&lng) {
            "Central Region"
        } else if (-42.0..=-35.0).contains(&lat) {
            "Northern Patagonia"
        } else if (-27.0..=-21.5).contains(&lat) {
            "Argentine North"
        } else {
            "Central Plains"
        };
        ("Argentina", zone)
    } else if (-56.0..=-17.5).contains(&lat) && (-75.5..=-66.5).contains(&lng) {
        let zone = if lat >= -33.5 {
            "Northern Chile"
        } else if lat >= -42.0 {
            "Central Chile"
        } else {
            "Southern Chile"
        };
        ("Chile", zone)
    } else if (-33.5..=5.5).contains(&lat) && (-74.0..=-34.5).contains(&lng) {
        ("Brazil", "Brazilian Territory")
    } else if (14.5..=32.5).contains(&lat) && (-118.0..=-86.5).contains(&lng) {
        ("Mexico", "Mexican Territory")
    } else if (24.5..=49.5).contains(&lat) && (-125.0..=-66.5).contains(&lng) {
        ("United States", "US Territory")
    } else if (35.0..=71.0).contains(&lat) && (-10.0..=40.0).contains(&lng) {
        ("Europe", "European Territory")
    } else {
        ("Unknown Region", "")
    };

    let place = if zone.is_empty() {
        region.to_owned()
    } else {
        format!("{zone}, {region}")
    };

    const FOREST_TYPES: [&str; 5] = ["Forest", "Jungle", "Woodland", "Nature Reserve", "Park"];
    let index = ((lat.abs() + lng.abs()) * 100.0) as usize % FOREST_TYPES.len();
    format!("{} of {place}", FOREST_TYPES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_of_identical_points_is_zero() {
        assert_eq!(haversine_km(-31.4, -64.2, -31.4, -64.2), 0.0);
    }

    #[test]
    fn haversine_matches_a_known_distance() {
        // Buenos Aires to Cordoba, roughly 646 km
        let d = haversine_km(-34.6037, -58.3816, -31.4201, -64.1888);
        assert!((d - 646.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn labels_resolve_known_regions() {
        assert!(place_label(-31.4, -64.2).contains("C\u{f3}rdoba Province, Argentina"));
        assert!(place_label(-42.6, -73.77).contains("Southern Chile"));
        assert!(place_label(-15.8, -47.9).contains("Brazil"));
        assert!(place_label(48.85, 2.35).contains("Europe"));
        assert!(place_label(0.0, 120.0).contains("Unknown Region"));
    }

    #[test]
    fn label_prefix_is_deterministic() {
        assert_eq!(place_label(-31.4, -64.2), place_label(-31.4, -64.2));
    }

    #[test]
    fn route_log_accumulates_distance_between_fixes() {
        let mut route = RouteLog::new();
        assert_eq!(route.record_fix(-31.40, -64.20), 0.0);
        let delta = route.record_fix(-31.41, -64.20);
        assert!(delta > 1.0 && delta < 1.3, "got {delta}");
    }

    #[test]
    fn capture_without_fix_falls_back_to_placeholders() {
        let mut route = RouteLog::new();
        route.capture_start();
        route.capture_end();
        assert_eq!(route.start_label(), NO_GPS_START);
        assert_eq!(route.end_label(), NO_GPS_END);
    }

    #[test]
    fn captured_points_carry_the_current_label() {
        let mut route = RouteLog::new();
        route.record_fix(-31.4, -64.2);
        route.capture_start();
        route.record_fix(-31.5, -64.3);
        route.capture_end();

        assert!(route.start_label().contains("Argentina"));
        assert!(route.end_label().contains("Argentina"));
        assert!(route.start().is_some());
        assert!(route.end().is_some());
    }
}
