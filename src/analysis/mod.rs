//! Life analysis: form inputs, prompt pipeline, post-processing and
//! weekly reflection.

pub mod extract;
pub mod inputs;
pub mod pipeline;
pub mod prompts;
pub mod reflection;
pub mod routes;

pub use inputs::LifeInputs;
pub use pipeline::{AnalysisMode, AnalysisPipeline, AnalysisResults};
