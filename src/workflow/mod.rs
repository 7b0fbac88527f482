//! Workflow execution: context threading, result merging, confidence
//! aggregation and the request boundary.

pub mod confidence;
pub mod context;
pub mod definition;
pub mod executor;
pub mod merge;
pub mod report;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use confidence::ConfidenceAccumulator;
pub use context::{AnalysisContext, ContextSnapshot, slot};
pub use definition::Workflow;
pub use executor::{ExecutionInput, WorkflowExecutor, WorkflowRun};
pub use merge::{
    GenericMerge, MergeRule, MergeRules, SharedMergeRule, SolutionMerge, SummaryMerge,
    TracebackMerge,
};
pub use report::{AnalysisReport, PartialReport, ProposedSolution, TracebackSection};
pub use service::{AnalysisRequest, AnalysisResponse, AnalysisService};
