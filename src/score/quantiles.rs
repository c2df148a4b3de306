//! Versioned reference tables for the composite score.
//!
//! The three 21-point breakpoint arrays (percentiles 0, 5, ..., 100) come
//! from the HTTP Archive distribution analysis behind the EcoIndex
//! methodology. Together with the 3-2-1 metric weights and the grade
//! thresholds they are the comparability baseline across implementations:
//! changing any value here breaks comparability with historical scores.

use crate::domain::Grade;

/// Breakpoints for DOM element counts. Weight in the formula: 3.
pub const DOM_BREAKPOINTS: [f64; 21] = [
    0.0, 47.0, 75.0, 159.0, 233.0, 298.0, 358.0, 417.0, 476.0, 537.0, 603.0, 674.0, 753.0, 843.0,
    949.0, 1076.0, 1237.0, 1459.0, 1801.0, 2479.0, 594_601.0,
];

/// Breakpoints for HTTP request counts. Weight in the formula: 2.
pub const REQUEST_BREAKPOINTS: [f64; 21] = [
    0.0, 2.0, 15.0, 25.0, 34.0, 42.0, 49.0, 56.0, 63.0, 70.0, 78.0, 86.0, 95.0, 105.0, 117.0,
    130.0, 147.0, 170.0, 205.0, 281.0, 3920.0,
];

/// Breakpoints for transfer sizes in kilobytes. Weight in the formula: 1.
pub const SIZE_BREAKPOINTS: [f64; 21] = [
    0.0, 1.37, 144.7, 319.53, 479.46, 631.97, 783.38, 937.91, 1098.62, 1265.47, 1448.32, 1648.27,
    1876.08, 2142.06, 2465.37, 2866.31, 3401.59, 4155.73, 5400.08, 8037.54, 223_212.26,
];

/// Grade thresholds as (minimum score, grade), checked highest first.
/// The trailing 0.0 entry makes the mapping total.
pub const GRADE_THRESHOLDS: [(f64, Grade); 7] = [
    (81.0, Grade::A),
    (71.0, Grade::B),
    (61.0, Grade::C),
    (51.0, Grade::D),
    (41.0, Grade::E),
    (31.0, Grade::F),
    (0.0, Grade::G),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strictly_ascending(table: &[f64; 21]) {
        for window in table.windows(2) {
            assert!(window[0] < window[1], "breakpoints must ascend: {window:?}");
        }
    }

    #[test]
    fn test_tables_are_strictly_ascending() {
        assert_strictly_ascending(&DOM_BREAKPOINTS);
        assert_strictly_ascending(&REQUEST_BREAKPOINTS);
        assert_strictly_ascending(&SIZE_BREAKPOINTS);
    }

    #[test]
    fn test_thresholds_descend_to_zero() {
        for window in GRADE_THRESHOLDS.windows(2) {
            assert!(window[0].0 > window[1].0);
        }
        assert_eq!(GRADE_THRESHOLDS[6].0, 0.0);
        assert_eq!(GRADE_THRESHOLDS[6].1, Grade::G);
    }
}
