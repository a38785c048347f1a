use std::fmt;
use std::ops::Range;

/// Caller-selected window of segments, half-open `[from, to)`.
///
/// Both bounds are either absolute segment indices or, when both fall inside
/// `[0, 1]`, fractions of the playlist length. `(0, 1)` is therefore always
/// read as "the whole playlist", never as "the first segment".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRange {
    pub from: f64,
    pub to: f64,
}

impl SegmentRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// The whole playlist.
    pub fn all() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// Clamp against a playlist of `total` segments.
    pub fn normalize(&self, total: usize) -> NormalizedRange {
        let mut min = self.from.min(self.to);
        let mut max = self.from.max(self.to);

        if (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max) {
            min = (total as f64 * min).floor();
            max = (total as f64 * max).floor();
        }

        // NaN bounds collapse to 0 through the saturating cast.
        let upper = total as f64;
        NormalizedRange {
            from: min.clamp(0.0, upper) as usize,
            to: max.clamp(0.0, upper) as usize,
        }
    }
}

impl Default for SegmentRange {
    fn default() -> Self {
        Self::all()
    }
}

impl From<NormalizedRange> for SegmentRange {
    fn from(range: NormalizedRange) -> Self {
        Self::new(range.from as f64, range.to as f64)
    }
}

/// Index window satisfying `0 <= from <= to <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedRange {
    pub from: usize,
    pub to: usize,
}

impl NormalizedRange {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn indices(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl fmt::Display for NormalizedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(from: f64, to: f64, total: usize) -> (usize, usize) {
        let range = SegmentRange::new(from, to).normalize(total);
        (range.from, range.to)
    }

    #[test]
    fn test_fraction_window() {
        assert_eq!(norm(0.0, 0.5, 10), (0, 5));
        assert_eq!(norm(0.25, 0.75, 10), (2, 7));
        assert_eq!(norm(0.0, 1.0, 7), (0, 7));
    }

    #[test]
    fn test_swapped_bounds_are_reordered() {
        assert_eq!(norm(8.0, 2.0, 10), (2, 8));
    }

    #[test]
    fn test_out_of_bounds_are_clamped() {
        assert_eq!(norm(-3.0, 1000.0, 10), (0, 10));
        assert_eq!(norm(20.0, 30.0, 10), (10, 10));
        assert_eq!(norm(0.0, f64::INFINITY, 10), (0, 10));
    }

    #[test]
    fn test_fraction_heuristic_wins_over_indices() {
        // A request for index range (0, 1) selects the whole playlist.
        assert_eq!(norm(0.0, 1.0, 10), (0, 10));
        assert_eq!(norm(1.0, 1.0, 10), (10, 10));
    }

    #[test]
    fn test_empty_playlist() {
        assert_eq!(norm(0.0, f64::INFINITY, 0), (0, 0));
        assert_eq!(norm(0.2, 0.8, 0), (0, 0));
    }

    #[test]
    fn test_nan_bounds_collapse_to_zero() {
        assert_eq!(norm(f64::NAN, f64::NAN, 10), (0, 0));
    }

    #[test]
    fn test_display_and_len() {
        let range = SegmentRange::new(2.0, 8.0).normalize(10);
        assert_eq!(range.to_string(), "2 - 8");
        assert_eq!(range.len(), 6);
        assert_eq!(range.indices().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 7]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_normalized_range_is_bounded(
            from in -1000.0f64..1000.0,
            to in -1000.0f64..1000.0,
            total in 0usize..500,
        ) {
            let range = SegmentRange::new(from, to).normalize(total);
            prop_assert!(range.from <= range.to);
            prop_assert!(range.to <= total);
        }

        #[test]
        fn prop_normalize_is_idempotent(
            from in -1000.0f64..1000.0,
            to in -1000.0f64..1000.0,
            total in 0usize..500,
        ) {
            let once = SegmentRange::new(from, to).normalize(total);
            // A normalized pair inside [0, 1] re-enters the fraction branch.
            prop_assume!(once.to > 1);
            let twice = SegmentRange::from(once).normalize(total);
            prop_assert_eq!(once, twice);
        }
    }
}
