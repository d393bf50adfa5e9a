//! Review pipeline domain.
//!
//! - [`plan::PipelinePlan`] - the fixed six-stage researcher/writer/reviewer chain
//! - [`output::StageOutput`] - what one stage produced, and how the final reply is read from it
//! - [`run::PipelineRun`] - ordered outputs of one execution

pub mod output;
pub mod plan;
pub mod run;
