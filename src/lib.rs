//! ecoscan - web page environmental footprint analyzer.
//!
//! Drives a headless browser through a fixed navigation protocol, extracts
//! raw page metrics, and computes a deterministic composite score plus
//! request analytics. See `service::Analyzer` for the entry seam.

pub mod analytics;
pub mod boundary;
pub mod browser;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod score;
pub mod service;
