//! Prompt building utilities for LLM providers.

use serde_json::Value;

/// Append JSON schema instructions to a prompt.
///
/// Returns the original prompt if schema is null.
pub fn build_schema_prompt(prompt: &str, schema: &Value) -> String {
    if schema.is_null() {
        return prompt.to_string();
    }

    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_default();
    format!(
        "{}\n\n---\n\nRespond with valid JSON matching this schema:\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        prompt, schema_str
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_schema_prompt_null_schema() {
        let prompt = "Summarize these logs";
        assert_eq!(build_schema_prompt(prompt, &Value::Null), prompt);
    }

    #[test]
    fn test_build_schema_prompt_with_schema() {
        let prompt = "Summarize these logs";
        let schema = json!({"type": "object", "properties": {"summary": {"type": "string"}}});
        let result = build_schema_prompt(prompt, &schema);

        assert!(result.starts_with(prompt));
        assert!(result.contains("\"summary\""));
        assert!(result.contains("Respond ONLY with valid JSON"));
    }
}
