//! Domain models for the ecoscan analysis pipeline.

pub mod models;

pub use models::{
    AnalysisResult, EcoIndexScore, EcoIndexSummary, Grade, PageMetrics, RequestRecord,
    ResourceBreakdown, ResourceKind, ResourceSlice,
};
