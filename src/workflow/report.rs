//! Analysis Report
//!
//! [`PartialReport`] is filled in by merge rules during a run and frozen into
//! an [`AnalysisReport`] at the end, with placeholders for anything no agent
//! populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{execution, placeholder};

/// Final structured output of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub tech_stack: String,
    pub environment: String,
    pub summary: String,
    pub root_cause: String,
    pub impact: String,
    pub prevention: String,
    pub proposed_solution: ProposedSolution,
    pub verification: String,
    pub confidence_score: f64,
    pub is_intermittent: bool,
    pub needs_fix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<TracebackSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedSolution {
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracebackSection {
    pub exception_type: String,
    pub relevant_frames: Vec<String>,
    pub analysis: String,
}

impl AnalysisReport {
    /// Every text field, labelled; used to check placeholder coverage
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("techStack", self.tech_stack.as_str()),
            ("environment", self.environment.as_str()),
            ("summary", self.summary.as_str()),
            ("rootCause", self.root_cause.as_str()),
            ("impact", self.impact.as_str()),
            ("prevention", self.prevention.as_str()),
            ("proposedSolution.description", self.proposed_solution.description.as_str()),
            ("proposedSolution.code", self.proposed_solution.code.as_str()),
            ("verification", self.verification.as_str()),
        ];
        if let Some(tb) = &self.traceback {
            fields.push(("traceback.exceptionType", tb.exception_type.as_str()));
            fields.push(("traceback.analysis", tb.analysis.as_str()));
        }
        fields
    }
}

/// Report under construction, owned by one execution
#[derive(Debug, Clone)]
pub struct PartialReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub tech_stack: String,
    pub environment: String,
    pub summary: String,
    pub root_cause: String,
    pub impact: String,
    pub prevention: String,
    pub solution_description: String,
    pub solution_code: String,
    pub verification: String,
    pub is_intermittent: bool,
    pub needs_fix: bool,
    pub traceback: Option<TracebackSection>,
}

impl PartialReport {
    pub fn new(tech_stack: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", execution::REPORT_ID_PREFIX, uuid::Uuid::new_v4().simple()),
            timestamp: Utc::now(),
            tech_stack: tech_stack.into(),
            environment: environment.into(),
            summary: String::new(),
            root_cause: String::new(),
            impact: String::new(),
            prevention: String::new(),
            solution_description: String::new(),
            solution_code: String::new(),
            verification: String::new(),
            is_intermittent: false,
            needs_fix: false,
            traceback: None,
        }
    }

    /// Freeze into an [`AnalysisReport`], filling blanks with placeholders.
    ///
    /// `confidence` is clamped to [0, 1]; a non-finite value becomes 0.
    pub fn finalize(self, confidence: f64) -> AnalysisReport {
        let confidence_score = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let traceback = self.traceback.map(|tb| TracebackSection {
            exception_type: or_placeholder(tb.exception_type, placeholder::EXCEPTION_TYPE),
            relevant_frames: tb
                .relevant_frames
                .into_iter()
                .filter(|f| !f.trim().is_empty())
                .collect(),
            analysis: or_placeholder(tb.analysis, placeholder::NOT_ANALYZED),
        });

        AnalysisReport {
            id: self.id,
            timestamp: self.timestamp,
            tech_stack: or_placeholder(self.tech_stack, execution::DEFAULT_TECH_STACK),
            environment: or_placeholder(self.environment, execution::DEFAULT_ENVIRONMENT),
            summary: or_placeholder(self.summary, placeholder::SUMMARY),
            root_cause: or_placeholder(self.root_cause, placeholder::NOT_ANALYZED),
            impact: or_placeholder(self.impact, placeholder::NOT_ANALYZED),
            prevention: or_placeholder(self.prevention, placeholder::PREVENTION),
            proposed_solution: ProposedSolution {
                description: or_placeholder(
                    self.solution_description,
                    placeholder::SOLUTION_DESCRIPTION,
                ),
                code: or_placeholder(self.solution_code, placeholder::SOLUTION_CODE),
            },
            verification: or_placeholder(self.verification, placeholder::VERIFICATION),
            confidence_score,
            is_intermittent: self.is_intermittent,
            needs_fix: self.needs_fix,
            traceback,
        }
    }
}

fn or_placeholder(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_report_gets_placeholders() {
        let report = PartialReport::new("Python", "production").finalize(0.0);

        assert!(report.id.starts_with("analysis_"));
        assert_eq!(report.summary, "No summary generated.");
        assert_eq!(report.root_cause, "Not analyzed.");
        assert_eq!(report.impact, "Not analyzed.");
        assert_eq!(report.proposed_solution.code, "No code generated.");
        assert!(report.traceback.is_none());
        assert!(report.text_fields().iter().all(|(_, v)| !v.is_empty()));
    }

    #[test]
    fn test_traceback_section_placeholders() {
        let mut partial = PartialReport::new("Java", "production");
        partial.traceback = Some(TracebackSection {
            exception_type: " ".to_string(),
            relevant_frames: vec!["at Foo.bar(Foo.java:10)".to_string(), "".to_string()],
            analysis: String::new(),
        });
        let tb = partial.finalize(0.5).traceback.unwrap();
        assert_eq!(tb.exception_type, "Unknown");
        assert_eq!(tb.analysis, "Not analyzed.");
        assert_eq!(tb.relevant_frames.len(), 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut partial = PartialReport::new("Rust", "staging");
        partial.solution_code = "```rust\nfn main() {}\n```".to_string();
        let json = serde_json::to_value(partial.finalize(0.75)).unwrap();

        assert_eq!(json["techStack"], "Rust");
        assert_eq!(json["confidenceScore"], 0.75);
        assert_eq!(json["proposedSolution"]["code"], "```rust\nfn main() {}\n```");
        assert!(json.get("traceback").is_none());
        assert!(json.get("isIntermittent").is_some());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(PartialReport::new("a", "b").finalize(1.4).confidence_score, 1.0);
        assert_eq!(PartialReport::new("a", "b").finalize(f64::NAN).confidence_score, 0.0);
    }

    proptest! {
        #[test]
        fn prop_no_text_field_is_blank(
            summary in "[ a-z]{0,8}",
            impact in "[ a-z]{0,8}",
            code in "[ a-z]{0,8}",
            tech in "[ a-z]{0,8}",
            confidence in -2.0f64..2.0,
        ) {
            let mut partial = PartialReport::new(tech, "production");
            partial.summary = summary;
            partial.impact = impact;
            partial.solution_code = code;
            partial.traceback = Some(TracebackSection::default());

            let report = partial.finalize(confidence);
            for (name, value) in report.text_fields() {
                prop_assert!(!value.trim().is_empty(), "{} is blank", name);
            }
            prop_assert!((0.0..=1.0).contains(&report.confidence_score));
        }
    }
}
