//! Numeric conversion helpers centralizing lossy casts.

use num_traits::cast::cast;

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Share of `part` in `whole` as a percentage; an empty whole reads as 0.
#[must_use]
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() {
        return 0.0;
    }
    part / whole * 100.0
}

/// Round to `places` decimal digits for presentation.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_guards_empty_whole() {
        assert!(percent(3.0, 0.0).abs() < f64::EPSILON);
        assert!((percent(3.0, 6.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn round_to_keeps_requested_places() {
        assert!((round_to(66.666_666, 1) - 66.7).abs() < 1e-9);
        assert!(round_to(f64::INFINITY, 2).abs() < f64::EPSILON);
        assert!((usize_to_f64(42) - 42.0).abs() < f64::EPSILON);
    }
}
