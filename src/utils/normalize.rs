//! Rating normalization across sources.
//!
//! Providers use different scales: Yelp and Google rate 0-5, Foursquare
//! rates 0-10. Cross-source aggregation (competitor analysis) converts
//! everything to the 0-5 scale first.

use crate::domain::entities::SourceId;

/// Converts a provider-native rating to the common 0-5 scale.
///
/// Foursquare ratings are halved; all results are clamped to `0.0..=5.0`.
pub fn normalized_rating(rating: f64, source: SourceId) -> f64 {
    let scaled = match source {
        SourceId::Foursquare => rating / 2.0,
        SourceId::Yelp | SourceId::GooglePlaces | SourceId::Mock => rating,
    };

    scaled.clamp(0.0, 5.0)
}

/// Weighted average of `(rating, weight)` pairs.
///
/// Falls back to the unweighted mean when all weights are zero; returns
/// `0.0` for an empty input.
pub fn weighted_score(entries: &[(f64, u32)]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }

    let total_weight: u64 = entries.iter().map(|(_, w)| u64::from(*w)).sum();

    if total_weight == 0 {
        let sum: f64 = entries.iter().map(|(r, _)| r).sum();
        return sum / entries.len() as f64;
    }

    let weighted_sum: f64 = entries
        .iter()
        .map(|(r, w)| r * f64::from(*w))
        .sum();

    weighted_sum / total_weight as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foursquare_rating_halved() {
        assert_eq!(normalized_rating(8.6, SourceId::Foursquare), 4.3);
        assert_eq!(normalized_rating(10.0, SourceId::Foursquare), 5.0);
    }

    #[test]
    fn test_five_scale_sources_unchanged() {
        assert_eq!(normalized_rating(4.5, SourceId::Yelp), 4.5);
        assert_eq!(normalized_rating(3.0, SourceId::GooglePlaces), 3.0);
        assert_eq!(normalized_rating(4.0, SourceId::Mock), 4.0);
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(normalized_rating(7.5, SourceId::Yelp), 5.0);
        assert_eq!(normalized_rating(-1.0, SourceId::GooglePlaces), 0.0);
    }

    #[test]
    fn test_weighted_score_empty() {
        assert_eq!(weighted_score(&[]), 0.0);
    }

    #[test]
    fn test_weighted_score_zero_weights_uses_mean() {
        let score = weighted_score(&[(4.0, 0), (2.0, 0)]);
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_weighted_score_respects_weights() {
        // 100 reviews at 5.0 dominate 1 review at 1.0.
        let score = weighted_score(&[(5.0, 100), (1.0, 1)]);
        assert!(score > 4.9);
    }
}
