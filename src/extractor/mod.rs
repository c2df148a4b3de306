//! Extraction of canonical metrics from a stabilized page.

pub mod metrics;

pub use metrics::{Extraction, MetricsExtractor};
