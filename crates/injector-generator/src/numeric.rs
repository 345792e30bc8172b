//! Numeric value generators.

use injector_core::Cardinality;
use rand::Rng;

/// Upper bound of the random critical threshold of a meta-service.
pub const MAX_META_CRITICAL: i64 = 100_000_000_000;

/// Magnitude of the random metric value range of service checks.
pub const METRIC_VALUE_SPAN: i64 = 1_000_000_000;

/// Generate a random integer in the given range (inclusive).
pub fn int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.random_range(min..=max)
}

/// Number of items a cardinality yields for one draw.
pub fn draw_count<R: Rng>(rng: &mut R, cardinality: Cardinality) -> u64 {
    match cardinality {
        Cardinality::Fixed(count) => count,
        Cardinality::Range { min, max } if min >= max => min.min(max),
        Cardinality::Range { min, max } => rng.random_range(min..=max),
    }
}

/// Warning and critical thresholds of a meta-service (warning is 80 % of critical).
pub fn meta_thresholds<R: Rng>(rng: &mut R) -> (i64, i64) {
    let critical = int_range(rng, 1, MAX_META_CRITICAL);
    (critical * 80 / 100, critical)
}

/// Warning and critical levels of a business activity for its calculation type.
///
/// Type 4 (ratio) counts upwards, so its levels are swapped.
pub fn ba_levels(calculation_type: i64) -> (i64, i64) {
    if calculation_type == 4 {
        (80, 90)
    } else {
        (90, 80)
    }
}

/// A random `low:high` metric range straddling zero.
pub fn metric_value_range<R: Rng>(rng: &mut R) -> (i64, i64) {
    (
        int_range(rng, -METRIC_VALUE_SPAN, 0),
        int_range(rng, 0, METRIC_VALUE_SPAN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_int_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let value = int_range(&mut rng, 10, 20);
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn test_draw_count() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(draw_count(&mut rng, Cardinality::Fixed(4)), 4);
        assert_eq!(draw_count(&mut rng, Cardinality::Range { min: 2, max: 2 }), 2);
        for _ in 0..100 {
            let count = draw_count(&mut rng, Cardinality::Range { min: 0, max: 5 });
            assert!(count <= 5);
        }
    }

    #[test]
    fn test_draw_count_inverted_range_never_exceeds_max() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(draw_count(&mut rng, Cardinality::Range { min: 5, max: 2 }), 2);
    }

    #[test]
    fn test_meta_thresholds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let (warning, critical) = meta_thresholds(&mut rng);
            assert!((1..=MAX_META_CRITICAL).contains(&critical));
            assert_eq!(warning, critical * 80 / 100);
        }
    }

    #[test]
    fn test_ba_levels() {
        assert_eq!(ba_levels(0), (90, 80));
        assert_eq!(ba_levels(3), (90, 80));
        assert_eq!(ba_levels(4), (80, 90));
    }

    #[test]
    fn test_metric_value_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let (low, high) = metric_value_range(&mut rng);
        assert!(low <= 0 && low >= -METRIC_VALUE_SPAN);
        assert!(high >= 0 && high <= METRIC_VALUE_SPAN);
    }
}
