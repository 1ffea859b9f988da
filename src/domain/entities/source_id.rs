//! Identifier for the data sources a business record can originate from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known data sources.
///
/// `Mock` is always available; the others are registered only when their
/// credentials are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Foursquare,
    Yelp,
    GooglePlaces,
    Mock,
}

impl SourceId {
    /// All known sources, in priority order.
    pub const ALL: [SourceId; 4] = [
        SourceId::Foursquare,
        SourceId::Yelp,
        SourceId::GooglePlaces,
        SourceId::Mock,
    ];

    /// Stable lowercase name used in URLs, cache keys, and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foursquare => "foursquare",
            Self::Yelp => "yelp",
            Self::GooglePlaces => "google_places",
            Self::Mock => "mock",
        }
    }

    /// Returns true for sources backed by an external paid/metered API.
    pub fn is_real(&self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foursquare" => Ok(Self::Foursquare),
            "yelp" => Ok(Self::Yelp),
            "google_places" => Ok(Self::GooglePlaces),
            "mock" => Ok(Self::Mock),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for id in SourceId::ALL {
            assert_eq!(id.as_str().parse::<SourceId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_name_is_error() {
        assert!("tripadvisor".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_only_mock_is_not_real() {
        assert!(!SourceId::Mock.is_real());
        assert!(SourceId::Foursquare.is_real());
        assert!(SourceId::Yelp.is_real());
        assert!(SourceId::GooglePlaces.is_real());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SourceId::GooglePlaces).unwrap();
        assert_eq!(json, r#""google_places""#);
    }
}
