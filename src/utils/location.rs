//! Location string parsing shared by the provider clients.
//!
//! A location is either a free-text place name (`"New York"`) or an
//! explicit `"lat,lng"` coordinate pair. Providers that require
//! coordinates resolve well-known city names through a small built-in
//! table instead of a geocoding API.

use crate::domain::entities::Coordinates;

/// Parsed form of a user-supplied location string.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Free-text place name, passed to providers that accept `near`.
    Near(String),
    /// Explicit coordinates.
    LatLng(Coordinates),
}

/// Well-known city coordinates used when a provider needs `lat,lng`
/// but the caller supplied a city name.
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("new york", 40.7128, -74.0060),
    ("los angeles", 34.0522, -118.2437),
    ("chicago", 41.8781, -87.6298),
    ("houston", 29.7604, -95.3698),
    ("miami", 25.7617, -80.1918),
    ("london", 51.5074, -0.1278),
    ("tokyo", 35.6762, 139.6503),
    ("sydney", -33.8688, 151.2093),
];

/// Coordinates used when nothing else matches (Manhattan).
pub const FALLBACK_COORDINATES: Coordinates = Coordinates {
    latitude: 40.7128,
    longitude: -74.0060,
};

/// Parses a location string into [`Location`].
///
/// A string is treated as coordinates only when it splits into exactly two
/// comma-separated parts that both parse as finite floats; anything else
/// is a place name.
pub fn parse(location: &str) -> Location {
    let trimmed = location.trim();

    if let Some((lat, lng)) = trimmed.split_once(',') {
        if let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
            if lat.is_finite() && lng.is_finite() {
                return Location::LatLng(Coordinates {
                    latitude: lat,
                    longitude: lng,
                });
            }
        }
    }

    Location::Near(trimmed.to_string())
}

/// Resolves a location string to coordinates for providers that only
/// accept `lat,lng`.
///
/// Explicit coordinates pass through; known city names match by substring
/// (case-insensitive); everything else falls back to
/// [`FALLBACK_COORDINATES`].
pub fn resolve_coordinates(location: &str) -> Coordinates {
    match parse(location) {
        Location::LatLng(coords) => coords,
        Location::Near(name) => {
            let lower = name.to_lowercase();
            for (city, lat, lng) in CITY_COORDINATES {
                if lower.contains(city) {
                    return Coordinates {
                        latitude: *lat,
                        longitude: *lng,
                    };
                }
            }
            FALLBACK_COORDINATES
        }
    }
}

/// Formats coordinates as the `lat,lng` string providers expect.
pub fn format_lat_lng(coords: &Coordinates) -> String {
    format!("{},{}", coords.latitude, coords.longitude)
}
