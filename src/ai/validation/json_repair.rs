//! JSON Repair
//!
//! Extraction and repair of JSON emitted by language models.
//!
//! Handles common output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - Missing closing braces/brackets
//! - Trailing commas
//! - Truncated strings
//! - Control characters in strings
//! - JSON embedded in explanatory text
//!
//! Solution output carries source code inside string values, so every pass
//! tracks string state and never touches braces that appear inside strings.

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ErrorCategory, LlmError, LogsiftError, Result};

// =============================================================================
// Convenience Functions
// =============================================================================

/// Extract and parse JSON from a model response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let repairer = JsonRepairer::new();
    repairer.parse_or_repair(content).map(|(value, _)| value)
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// JSON repair strategies
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse JSON, attempting repair if initial parse fails
    ///
    /// Returns (Value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = self.preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Initial JSON parse failed, attempting repair");

        for attempt in 1..=self.max_repair_attempts {
            let repaired = self.repair_attempt(&cleaned, attempt);

            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                warn!("Model JSON repaired on attempt {}", attempt);
                return Ok((value, true));
            }
        }

        // Final attempt: extract JSON from mixed content
        if let Some(extracted) = self.extract_json_from_mixed(&cleaned)
            && let Ok(value) = serde_json::from_str::<Value>(&extracted)
        {
            warn!("Model JSON extracted from surrounding prose");
            return Ok((value, true));
        }

        Err(LogsiftError::Llm(LlmError::new(
            ErrorCategory::ParseError,
            format!(
                "Failed to parse or repair JSON after {} attempts. Content preview: {}...",
                self.max_repair_attempts,
                cleaned.chars().take(200).collect::<String>()
            ),
        )))
    }

    /// Trim, drop a BOM and strip an enclosing code fence
    fn preprocess(&self, raw: &str) -> String {
        let s = raw.trim().trim_start_matches('\u{feff}');
        self.strip_code_fences(s).trim().to_string()
    }

    /// Strip markdown code fences
    fn strip_code_fences(&self, s: &str) -> String {
        let mut result = s.to_string();

        // Remove ```json ... ``` or ``` ... ```
        if result.starts_with("```")
            && let Some(first_newline) = result.find('\n')
        {
            result = result[first_newline + 1..].to_string();
        }

        if result.ends_with("```") {
            result = result[..result.len() - 3].trim_end().to_string();
        }

        result
    }

    /// Attempt repair with increasing aggressiveness
    fn repair_attempt(&self, s: &str, level: usize) -> String {
        let mut result = s.to_string();

        match level {
            1 => {
                // Level 1: Fix trailing commas and simple bracket issues
                result = self.fix_trailing_commas(&result);
                result = self.balance_brackets(&result);
            }
            2 => {
                // Level 2: Also fix truncated strings
                result = self.fix_trailing_commas(&result);
                result = self.fix_truncated_strings(&result);
                result = self.balance_brackets(&result);
            }
            _ => {
                // Level 3: Aggressive repair
                result = self.fix_trailing_commas(&result);
                result = self.remove_control_chars(&result);
                result = self.fix_truncated_strings(&result);
                result = self.balance_brackets(&result);
                result = self.truncate_to_valid(&result);
            }
        }

        result
    }

    /// Fix trailing commas before ] or }
    fn fix_trailing_commas(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let chars: Vec<char> = s.chars().collect();

        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];

            if ch == ',' {
                // Look ahead, skipping whitespace
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }

                if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                    // Skip this comma
                    i += 1;
                    continue;
                }
            }

            result.push(ch);
            i += 1;
        }

        result
    }

    /// Balance brackets by adding missing closers
    fn balance_brackets(&self, s: &str) -> String {
        let mut result = s.to_string();

        let mut brace_count = 0;
        let mut bracket_count = 0;
        let mut in_string = false;
        let mut escape = false;

        for ch in result.chars() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => brace_count += 1,
                '}' if !in_string => brace_count -= 1,
                '[' if !in_string => bracket_count += 1,
                ']' if !in_string => bracket_count -= 1,
                _ => {}
            }
        }

        // Close unclosed strings
        if in_string {
            result.push('"');
        }

        // Add missing brackets/braces
        for _ in 0..bracket_count {
            result.push(']');
        }

        for _ in 0..brace_count {
            result.push('}');
        }

        result
    }

    /// Fix truncated strings by closing them
    fn fix_truncated_strings(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 10);
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => {
                    escape = true;
                    result.push(ch);
                }
                '"' => {
                    in_string = !in_string;
                    result.push(ch);
                }
                '\n' | '\r' if in_string => {
                    // Unterminated string at newline - close it
                    result.push('"');
                    in_string = false;
                    result.push(ch);
                }
                _ => result.push(ch),
            }
        }

        // Close final unterminated string
        if in_string {
            result.push('"');
        }

        result
    }

    /// Remove control characters that break JSON parsing
    fn remove_control_chars(&self, s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\r' || *c == '\t')
            .collect()
    }

    /// Truncate to last valid JSON structure
    fn truncate_to_valid(&self, s: &str) -> String {
        // Find the last complete object/array
        let mut last_valid = 0;
        let mut brace_count = 0;
        let mut bracket_count = 0;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s.char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => brace_count += 1,
                '}' if !in_string => {
                    brace_count -= 1;
                    if brace_count == 0 && bracket_count == 0 {
                        last_valid = i + 1;
                    }
                }
                '[' if !in_string => bracket_count += 1,
                ']' if !in_string => {
                    bracket_count -= 1;
                    if brace_count == 0 && bracket_count == 0 {
                        last_valid = i + 1;
                    }
                }
                _ => {}
            }
        }

        if last_valid > 0 && last_valid < s.len() {
            s[..last_valid].to_string()
        } else {
            s.to_string()
        }
    }

    /// Extract JSON from mixed content (e.g., LLM explanations around JSON)
    fn extract_json_from_mixed(&self, s: &str) -> Option<String> {
        // Find first { or [
        let start = s.find(['{', '['])?;
        let start_char = s.chars().nth(start)?;
        let end_char = if start_char == '{' { '}' } else { ']' };

        // Find matching closer
        let mut brace_depth = 0;
        let mut bracket_depth = 0;
        let mut in_string = false;
        let mut escape = false;
        let mut end = start;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => brace_depth += 1,
                '}' if !in_string => {
                    brace_depth -= 1;
                    if brace_depth == 0 && bracket_depth == 0 && ch == end_char {
                        end = start + i + 1;
                        break;
                    }
                }
                '[' if !in_string => bracket_depth += 1,
                ']' if !in_string => {
                    bracket_depth -= 1;
                    if brace_depth == 0 && bracket_depth == 0 && ch == end_char {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if end > start {
            Some(s[start..end].to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let repairer = JsonRepairer::new();
        let (_, repaired) = repairer
            .parse_or_repair(r#"{"summary": "Redis connection refused"}"#)
            .unwrap();
        assert!(!repaired);
    }

    #[test]
    fn test_strip_code_fences() {
        let input = "```json\n{\"exceptionType\": \"AttributeError\"}\n```";
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["exceptionType"], "AttributeError");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let input = r#"{"relevantFrames": ["payment_service.py:42",], "confidenceScore": 0.8,}"#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["relevantFrames"][0], "payment_service.py:42");
    }

    #[test]
    fn test_balance_brackets() {
        let input = r#"{"relevantFrames": ["a.py:1", "b.py:2""#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["relevantFrames"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_braces_inside_strings_are_preserved() {
        let input = r#"{"solutionCode": "if user is None: {\"error\": 1}", "prevention": "add guards""#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["solutionCode"], "if user is None: {\"error\": 1}");
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = r#"Here is my analysis:
{"summary": "Cache unavailable", "confidenceScore": 0.7}
Let me know if you need more."#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["summary"], "Cache unavailable");
    }

    #[test]
    fn test_truncated_string() {
        let input = r#"{"analysis": "unterminated
, "other": "value"}"#;
        assert!(extract_json_from_response(input).is_ok());
    }

    #[test]
    fn test_unrepairable_is_parse_error() {
        let err = extract_json_from_response("the model refused to answer").unwrap_err();
        match err {
            LogsiftError::Llm(e) => assert_eq!(e.category, ErrorCategory::ParseError),
            other => panic!("unexpected error: {other}"),
        }
    }
}
