//! Shared text helpers: blank checks, lossy result filtering and token
//! estimation for prompt sizing.

use std::fmt::Display;

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Returns the trimmed text when it carries content, `None` for blank input.
#[inline]
pub fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// =============================================================================
// Result Filtering
// =============================================================================

/// Drop a failed result, logging it at warn level.
pub fn log_filter_warn<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            None
        }
    }
}

// =============================================================================
// Token Estimation
// =============================================================================

/// Token estimation for prompt sizing
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    /// Characters per token for ASCII text (default: 4.0)
    pub ascii_chars_per_token: f32,
    /// Characters per token for non-ASCII (CJK, etc.) (default: 1.5)
    pub non_ascii_chars_per_token: f32,
    /// Extra tokens per line for structured text like stack traces (default: 0.5)
    pub overhead_per_line: f32,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            ascii_chars_per_token: 4.0,
            non_ascii_chars_per_token: 1.5,
            overhead_per_line: 0.5,
        }
    }
}

impl TokenEstimator {
    /// Estimate token count for content
    pub fn estimate(&self, content: &str) -> usize {
        if content.is_empty() {
            return 0;
        }

        let mut ascii_chars = 0usize;
        let mut non_ascii_chars = 0usize;

        for c in content.chars() {
            if c.is_ascii() {
                ascii_chars += 1;
            } else {
                non_ascii_chars += 1;
            }
        }

        let line_count = content.lines().count();
        let overhead = (line_count as f32 * self.overhead_per_line) as usize;

        let ascii_tokens = (ascii_chars as f32 / self.ascii_chars_per_token) as usize;
        let non_ascii_tokens = (non_ascii_chars as f32 / self.non_ascii_chars_per_token) as usize;

        ascii_tokens + non_ascii_tokens + overhead
    }
}

/// Estimate token count from content
#[inline]
pub fn estimate_tokens(content: &str) -> usize {
    TokenEstimator::default().estimate(content)
}

/// Truncate content to fit within token limit
///
/// Keeps the head of the content and breaks at a line boundary when possible.
pub fn truncate_to_token_limit(content: &str, max_tokens: usize) -> String {
    let estimated = estimate_tokens(content);
    if estimated <= max_tokens {
        return content.to_string();
    }

    let ratio = max_tokens as f64 / estimated as f64;
    let max_chars = (content.len() as f64 * ratio * 0.95) as usize; // 5% buffer

    if max_chars >= content.len() {
        return content.to_string();
    }

    let mut cut = max_chars.min(content.len());
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &content[..cut];

    if let Some(pos) = truncated.rfind('\n') {
        return format!("{}\n... [truncated]", &content[..pos]);
    }

    format!("{}... [truncated]", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_warn() {
        let ok: Result<u8, String> = Ok(1);
        let err: Result<u8, String> = Err("bad row".to_string());
        assert_eq!(log_filter_warn(ok, "row"), Some(1));
        assert_eq!(log_filter_warn(err, "row"), None);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("summarizer"), "Summarizer");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  text "), Some("text"));
        assert_eq!(non_blank(" \n\t"), None);
    }

    #[test]
    fn test_estimate_tokens_empty() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_estimate_tokens_ascii() {
        let result = estimate_tokens("hello world!");
        assert!(result > 0);
        assert!(result < 10);
    }

    #[test]
    fn test_truncate_to_token_limit_no_truncation() {
        let content = "Short content.";
        assert_eq!(truncate_to_token_limit(content, 1000), content);
    }

    #[test]
    fn test_truncate_to_token_limit_with_truncation() {
        let content = "line one of the log\nline two of the log\nline three of the log";
        let result = truncate_to_token_limit(content, 5);
        assert!(result.contains("truncated"));
        assert!(result.len() < content.len() + 20);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let content = "에러 발생 ".repeat(200);
        let result = truncate_to_token_limit(&content, 10);
        assert!(result.contains("truncated"));
    }
}
