//! Conversion between line offsets and fractional reading positions
//!
//! Fractions are what gets persisted: they survive changes of terminal size
//! and text scale. The round trip is deliberately lossy near the end of the
//! content, where any offset showing the last line reports `1.0`.

/// Fraction in `[0, 1]` for a viewport starting at `offset`.
///
/// Returns `1.0` once the last line is on screen.
pub fn to_fraction(offset: usize, visible_lines: usize, total_lines: usize) -> f64 {
    if offset + visible_lines >= total_lines {
        return 1.0;
    }
    offset as f64 / total_lines as f64
}

/// Line offset for a persisted fraction. The caller clamps the result.
pub fn from_fraction(fraction: f64, total_lines: usize) -> usize {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * total_lines as f64) as usize
}

/// Largest valid top-of-viewport offset
pub fn max_offset(total_lines: usize, visible_lines: usize) -> usize {
    total_lines.saturating_sub(visible_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fraction_of_middle_offset() {
        assert_eq!(to_fraction(25, 10, 100), 0.25);
    }

    #[test]
    fn fraction_at_top_is_zero() {
        assert_eq!(to_fraction(0, 10, 100), 0.0);
    }

    #[test]
    fn short_content_is_fully_read() {
        assert_eq!(to_fraction(0, 30, 12), 1.0);
    }

    #[test]
    fn from_fraction_scales_by_total() {
        assert_eq!(from_fraction(0.5, 200), 100);
        assert_eq!(from_fraction(0.0, 200), 0);
        assert_eq!(from_fraction(1.0, 200), 200);
    }

    #[test]
    fn from_fraction_rejects_garbage() {
        assert_eq!(from_fraction(f64::NAN, 50), 0);
        assert_eq!(from_fraction(-3.0, 50), 0);
        assert_eq!(from_fraction(7.5, 50), 50);
    }

    #[test]
    fn max_offset_never_negative() {
        assert_eq!(max_offset(5, 20), 0);
        assert_eq!(max_offset(50, 20), 30);
    }

    proptest! {
        #[test]
        fn last_page_visible_is_one(total in 0usize..1000, visible in 1usize..100, extra in 0usize..50) {
            let offset = total.saturating_sub(visible) + extra;
            prop_assert_eq!(to_fraction(offset, visible, total), 1.0);
        }

        #[test]
        fn fraction_is_in_unit_range(offset in 0usize..1000, visible in 1usize..100, total in 0usize..1000) {
            let f = to_fraction(offset, visible, total);
            prop_assert!((0.0..=1.0).contains(&f));
        }
    }
}
