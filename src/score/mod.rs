//! Pure scoring engine: quantile interpolation, composite score, grade and
//! environmental impact.
//!
//! No I/O, no state, no failure paths - every function is total over
//! non-negative inputs and all outputs are clamped.

pub mod quantiles;

use crate::domain::{EcoIndexScore, Grade, PageMetrics};
use quantiles::{DOM_BREAKPOINTS, REQUEST_BREAKPOINTS, SIZE_BREAKPOINTS};

/// Composite score calculator over the fixed reference tables.
pub struct ScoreEngine;

impl ScoreEngine {
    /// Interpolated position of `value` inside a 21-point breakpoint
    /// array, clamped to [0, 20].
    ///
    /// Values at or below the first breakpoint map to 0, values at or
    /// above the last map to the last index. Between breakpoints the
    /// position is linear: `(i - 1) + (value - lower) / (upper - lower)`
    /// for the first breakpoint `i` with `value < table[i]`.
    pub fn quantile_position(value: f64, table: &[f64]) -> f64 {
        let last = table.len() - 1;
        if value <= table[0] {
            return 0.0;
        }
        if value >= table[last] {
            return last as f64;
        }
        for (i, upper) in table.iter().enumerate().skip(1) {
            if value < *upper {
                let lower = table[i - 1];
                return (i - 1) as f64 + (value - lower) / (upper - lower);
            }
        }
        last as f64
    }

    /// Composite score: `100 - 5 * (3*Q_dom + 2*Q_req + Q_size) / 6`,
    /// clamped to [0, 100].
    pub fn compute_score(metrics: &PageMetrics) -> f64 {
        let q_dom = Self::quantile_position(f64::from(metrics.dom_elements), &DOM_BREAKPOINTS);
        let q_req = Self::quantile_position(f64::from(metrics.requests), &REQUEST_BREAKPOINTS);
        let q_size = Self::quantile_position(metrics.size_kb, &SIZE_BREAKPOINTS);

        let weighted = 3.0 * q_dom + 2.0 * q_req + q_size;
        (100.0 - 5.0 * weighted / 6.0).clamp(0.0, 100.0)
    }

    /// Greenhouse gas emissions in gCO2e per page view.
    ///
    /// Affine in `(100 - score)`: 2 gCO2e at a perfect score, 4 at zero.
    pub fn compute_ghg(score: f64) -> f64 {
        2.0 + 2.0 * (100.0 - score) / 100.0
    }

    /// Water consumption in centiliters per page view.
    ///
    /// Affine in `(100 - score)`: 3 cl at a perfect score, 6 at zero.
    pub fn compute_water(score: f64) -> f64 {
        3.0 + 3.0 * (100.0 - score) / 100.0
    }

    /// Full score computation for one set of metrics.
    pub fn compute(metrics: &PageMetrics) -> EcoIndexScore {
        let score = Self::compute_score(metrics);
        EcoIndexScore {
            score,
            grade: Grade::from_score(score),
            ghg: Self::compute_ghg(score),
            water: Self::compute_water(score),
        }
    }
}
