//! Merge Rules
//!
//! Fold one [`AgentResult`] into the partial report and the running context.
//! Rules are registered per [`AgentRole`] and can be replaced; roles without a
//! rule fall back to [`GenericMerge`].

use std::collections::HashMap;
use std::sync::Arc;

use super::context::{AnalysisContext, slot};
use super::report::{PartialReport, TracebackSection};
use crate::agents::{AgentOutput, AgentResult};
use crate::registry::AgentRole;
use crate::types::non_blank;

pub trait MergeRule: Send + Sync {
    fn merge(&self, report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult);
}

pub type SharedMergeRule = Arc<dyn MergeRule>;

/// Overwrite `field` unless `value` is blank
fn assign(field: &mut String, value: &str) {
    if non_blank(value).is_some() {
        *field = value.to_string();
    }
}

/// Set a context slot unless `value` is blank
fn set_slot(context: &mut AnalysisContext, key: &str, value: &str) {
    if non_blank(value).is_some() {
        context.set(key, value);
    }
}

/// Summary, root cause and impact; summary text joins the running analysis
pub struct SummaryMerge;

impl MergeRule for SummaryMerge {
    fn merge(&self, report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult) {
        let AgentOutput::Summary(summary) = &result.output else {
            return GenericMerge.merge(report, context, result);
        };

        assign(&mut report.summary, &summary.summary);
        assign(&mut report.root_cause, &summary.root_cause);
        assign(&mut report.impact, &summary.impact);
        report.is_intermittent |= summary.is_intermittent;
        report.needs_fix |= summary.needs_fix;

        context.append(slot::ANALYSIS, &summary.summary);
        set_slot(context, slot::SUMMARY, &summary.summary);
    }
}

/// Traceback section; trace analysis joins the running analysis
pub struct TracebackMerge;

impl MergeRule for TracebackMerge {
    fn merge(&self, report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult) {
        let AgentOutput::Traceback(tb) = &result.output else {
            return GenericMerge.merge(report, context, result);
        };

        let section = report.traceback.get_or_insert_with(TracebackSection::default);
        assign(&mut section.exception_type, &tb.exception_type);
        assign(&mut section.analysis, &tb.analysis);
        if !tb.relevant_frames.is_empty() {
            section.relevant_frames = tb.relevant_frames.clone();
        }
        report.is_intermittent |= tb.is_intermittent;
        report.needs_fix |= tb.needs_fix;

        context.append(slot::ANALYSIS, &tb.analysis);
        set_slot(context, slot::EXCEPTION_TYPE, &tb.exception_type);
    }
}

/// Proposed solution, verification and prevention
pub struct SolutionMerge;

impl MergeRule for SolutionMerge {
    fn merge(&self, report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult) {
        let AgentOutput::Solution(solution) = &result.output else {
            return GenericMerge.merge(report, context, result);
        };

        assign(&mut report.solution_description, &solution.description);
        assign(&mut report.solution_code, &solution.code);
        assign(&mut report.verification, &solution.verification_steps);
        assign(&mut report.prevention, &solution.prevention);

        set_slot(context, slot::SOLUTION, &solution.description);
    }
}

/// Leaves the report untouched; any analysis text joins the running analysis
pub struct GenericMerge;

impl MergeRule for GenericMerge {
    fn merge(&self, _report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult) {
        if let Some(text) = result.output.analysis_text() {
            context.append(slot::ANALYSIS, text);
        }
    }
}

/// Merge rules keyed by role
#[derive(Clone)]
pub struct MergeRules {
    rules: HashMap<AgentRole, SharedMergeRule>,
    fallback: SharedMergeRule,
}

impl Default for MergeRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MergeRules {
    /// Rules for the built-in roles
    pub fn builtin() -> Self {
        let mut rules: HashMap<AgentRole, SharedMergeRule> = HashMap::new();
        rules.insert(AgentRole::Summarizer, Arc::new(SummaryMerge));
        rules.insert(AgentRole::Traceback, Arc::new(TracebackMerge));
        rules.insert(AgentRole::Solution, Arc::new(SolutionMerge));
        rules.insert(AgentRole::Generic, Arc::new(GenericMerge));
        Self {
            rules,
            fallback: Arc::new(GenericMerge),
        }
    }

    /// Install or replace the rule for `role`, returning the previous one
    pub fn register(&mut self, role: AgentRole, rule: SharedMergeRule) -> Option<SharedMergeRule> {
        self.rules.insert(role, rule)
    }

    pub fn rule_for(&self, role: &AgentRole) -> &dyn MergeRule {
        self.rules.get(role).unwrap_or(&self.fallback).as_ref()
    }

    pub fn apply(&self, report: &mut PartialReport, context: &mut AnalysisContext, result: &AgentResult) {
        self.rule_for(&result.role).merge(report, context, result);
    }
}

impl std::fmt::Debug for MergeRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut roles: Vec<String> = self.rules.keys().map(|r| r.to_string()).collect();
        roles.sort();
        f.debug_struct("MergeRules").field("roles", &roles).finish()
    }
}
