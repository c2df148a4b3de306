//! Run orchestration: the analyzer seam, result assembly, the optional
//! HTML report and the sidecar client.

pub mod analyzer;
pub mod assembler;
pub mod reporter;
pub mod runner;

pub use analyzer::{validate_url, AnalyzeOptions, Analyzer, InProcessAnalyzer};
pub use assembler::ResultAssembler;
pub use runner::SidecarAnalyzer;
