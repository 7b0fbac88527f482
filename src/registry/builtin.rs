//! Built-in agents and workflow templates seeded into a fresh registry.

use super::agent::{Agent, AgentRole, WorkflowTemplate};
use crate::constants::registry::DEFAULT_AGENT_MODEL;

pub const FULL_ANALYSIS: &str = "full-analysis";
pub const QUICK_SUMMARY: &str = "quick-summary";

pub fn builtin_agents() -> Vec<Agent> {
    vec![
        Agent::new(
            "summarizer",
            "Summarizer Agent",
            DEFAULT_AGENT_MODEL,
            AgentRole::Summarizer,
        )
        .with_description("Reads raw logs and creates a high-level summary of the issue.")
        .with_instructions(
            "You are an expert software engineer specializing in summarizing complex error logs. \
             Your task is to provide a concise, easy-to-understand summary of the provided log data. \
             Focus on the core error and its immediate context.",
        ),
        Agent::new(
            "traceback",
            "Traceback Agent",
            DEFAULT_AGENT_MODEL,
            AgentRole::Traceback,
        )
        .with_description("Parses stack traces to identify the exception type and key frames.")
        .with_instructions(
            "You are a debugging specialist. Analyze the provided stack traceback. \
             Identify the primary exception type, the most relevant frames in the call stack, \
             and explain the flow of execution that led to the error. Be precise and technical.",
        ),
        Agent::new(
            "solution",
            "Solution Agent",
            DEFAULT_AGENT_MODEL,
            AgentRole::Solution,
        )
        .with_description(
            "Generates a potential fix, including code snippets and verification steps.",
        )
        .with_instructions(
            "You are a senior software architect. Based on the error summary and traceback analysis, \
             propose a concrete solution. Your solution must include a code snippet demonstrating the fix, \
             a clear explanation of the change, and steps to verify the solution is effective.",
        ),
    ]
}

pub fn builtin_workflow_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate::new(
            FULL_ANALYSIS,
            "Full Analysis",
            &["summarizer", "traceback", "solution"],
        ),
        WorkflowTemplate::new(QUICK_SUMMARY, "Quick Summary", &["summarizer", "solution"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_agents_have_matching_roles() {
        for agent in builtin_agents() {
            assert_eq!(AgentRole::from_builtin_id(&agent.id), Some(agent.role.clone()));
            assert_eq!(agent.model, "gemini-2.5-flash");
            assert!(!agent.instructions.is_empty());
            assert!(!agent.description.is_empty());
        }
    }

    #[test]
    fn test_builtin_templates_reference_builtin_agents() {
        let ids: Vec<String> = builtin_agents().into_iter().map(|a| a.id).collect();
        for template in builtin_workflow_templates() {
            assert!(template.agents.iter().all(|a| ids.contains(a)));
        }
    }
}
