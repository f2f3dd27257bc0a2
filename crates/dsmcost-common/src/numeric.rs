//! Non-finite recovery policy for every scalar the model produces

/// Clamp `value` into `[floor, ceiling]`, or `None` if it is NaN or infinite.
///
/// Callers decide what `None` means at their site: the engine rejects the
/// proposal, constructors substitute the floor.
#[inline]
pub fn clamp_finite(value: f64, floor: f64, ceiling: f64) -> Option<f64> {
    debug_assert!(floor <= ceiling, "floor ({}) must be <= ceiling ({})", floor, ceiling);
    if value.is_finite() {
        Some(value.clamp(floor, ceiling))
    } else {
        None
    }
}

/// Like [`clamp_finite`], substituting `floor` for non-finite input.
#[inline]
pub fn clamp_or_floor(value: f64, floor: f64, ceiling: f64) -> f64 {
    clamp_finite(value, floor, ceiling).unwrap_or(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_into_range() {
        assert_eq!(clamp_finite(0.5, 1e-4, 1.0), Some(0.5));
        assert_eq!(clamp_finite(0.0, 1e-4, 1.0), Some(1e-4));
        assert_eq!(clamp_finite(3.0, 1e-4, 1.0), Some(1.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(clamp_finite(f64::NAN, 0.0, 1.0), None);
        assert_eq!(clamp_finite(f64::INFINITY, 0.0, 1.0), None);
        assert_eq!(clamp_finite(f64::NEG_INFINITY, 0.0, 1.0), None);
    }

    #[test]
    fn test_floor_substitution() {
        assert_eq!(clamp_or_floor(f64::NAN, 1e-4, 1.0), 1e-4);
        assert_eq!(clamp_or_floor(0.25, 1e-4, 1.0), 0.25);
    }
}
