//! Analysis Context
//!
//! Named text slots threaded through one execution. Slots written by merge
//! rules accumulate, so every later agent sees what earlier agents produced.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::execution::SECTION_SEPARATOR;
use crate::types::non_blank;

/// Well-known slot names
pub mod slot {
    pub const LOGS: &str = "logs";
    pub const TRACEBACK: &str = "traceback";
    pub const ANALYSIS: &str = "analysis";
    pub const TECH_STACK: &str = "techStack";
    pub const ENVIRONMENT: &str = "environment";
    pub const SUMMARY: &str = "summary";
    pub const EXCEPTION_TYPE: &str = "exceptionType";
    pub const SOLUTION: &str = "solution";
}

/// Mutable context owned by one execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisContext {
    slots: BTreeMap<String, String>,
}

impl AnalysisContext {
    /// Seed a context from raw input.
    ///
    /// `logs` carries the formatting directive ahead of the raw logs;
    /// `traceback` carries the raw logs alone.
    pub fn seed(
        raw_logs: &str,
        directive: Option<&str>,
        tech_stack: &str,
        environment: &str,
    ) -> Self {
        let logs = match directive.and_then(non_blank) {
            Some(directive) => format!("{}{}{}", directive, SECTION_SEPARATOR, raw_logs),
            None => raw_logs.to_string(),
        };

        let mut context = Self::default();
        context.set(slot::LOGS, logs);
        context.set(slot::TRACEBACK, raw_logs);
        context.set(slot::TECH_STACK, tech_stack);
        context.set(slot::ENVIRONMENT, environment);
        context
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Overwrite a slot
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.slots.insert(key.into(), value.into());
    }

    /// Append to a slot, separated from existing content by a blank line.
    ///
    /// Blank text is ignored.
    pub fn append(&mut self, key: &str, text: &str) {
        let Some(text) = non_blank(text) else {
            return;
        };
        match self.slots.get_mut(key) {
            Some(existing) if !existing.trim().is_empty() => {
                existing.push_str(SECTION_SEPARATOR);
                existing.push_str(text);
            }
            _ => {
                self.slots.insert(key.to_string(), text.to_string());
            }
        }
    }

    /// Read-only copy handed to an adapter
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            slots: self.slots.clone(),
        }
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

/// Immutable view of the context at the moment an agent is invoked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    slots: BTreeMap<String, String>,
}

impl ContextSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    /// Slot content, or `default` when the slot is missing or blank
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(non_blank).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ContextSnapshot {
    fn from(entries: [(&str, &str); N]) -> Self {
        Self {
            slots: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_with_directive() {
        let ctx = AnalysisContext::seed("ERROR boom", Some("Write a postmortem."), "Python", "staging");
        assert_eq!(ctx.get(slot::LOGS), Some("Write a postmortem.\n\nERROR boom"));
        assert_eq!(ctx.get(slot::TRACEBACK), Some("ERROR boom"));
        assert_eq!(ctx.get(slot::TECH_STACK), Some("Python"));
        assert_eq!(ctx.get(slot::ENVIRONMENT), Some("staging"));
        assert_eq!(ctx.get(slot::ANALYSIS), None);
    }

    #[test]
    fn test_seed_ignores_blank_directive() {
        let ctx = AnalysisContext::seed("ERROR boom", Some("  "), "Unknown", "production");
        assert_eq!(ctx.get(slot::LOGS), Some("ERROR boom"));
    }

    #[test]
    fn test_append_accumulates() {
        let mut ctx = AnalysisContext::default();
        ctx.append(slot::ANALYSIS, "first");
        ctx.append(slot::ANALYSIS, "   ");
        ctx.append(slot::ANALYSIS, "second");
        assert_eq!(ctx.get(slot::ANALYSIS), Some("first\n\nsecond"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ctx = AnalysisContext::seed("logs", None, "Rust", "production");
        let snapshot = ctx.snapshot();
        ctx.append(slot::ANALYSIS, "later");

        assert_eq!(snapshot.get(slot::ANALYSIS), None);
        assert_eq!(snapshot.get_or(slot::ANALYSIS, "none"), "none");
        assert_eq!(snapshot.get_or(slot::TECH_STACK, "Unknown"), "Rust");
    }
}
