//! Timeout and Deadline Helpers
//!
//! Wraps async operations with a timeout and tracks a whole-run deadline.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{Deadline, with_timeout};
//!
//! let deadline = Deadline::after(Duration::from_secs(600));
//! let budget = deadline.budget(Duration::from_secs(120));
//! let result = with_timeout(budget, async { /* model call */ }, "agent summarizer").await?;
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::types::{LogsiftError, Result};

/// Whole-run deadline shared by every step of one execution
///
/// Measured on the tokio clock, the same clock step timeouts use.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
    total: Duration,
}

impl Deadline {
    /// Deadline that expires `total` from now
    pub fn after(total: Duration) -> Self {
        Self {
            expires_at: Instant::now() + total,
            total,
        }
    }

    /// Time left before the deadline (zero once expired)
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The full run budget this deadline was created with
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Budget for the next step: the step timeout, capped by the remaining run time
    pub fn budget(&self, step: Duration) -> Duration {
        step.min(self.remaining())
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
///
/// # Arguments
///
/// * `timeout` - Maximum duration to wait
/// * `future` - The async operation to execute
/// * `operation_name` - Description of the operation (for error messages)
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(LogsiftError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, LogsiftError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, LogsiftError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), LogsiftError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(LogsiftError::llm("boom")) },
            "failing operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), LogsiftError::Llm(_)));
    }

    #[tokio::test]
    async fn test_deadline_budget_is_capped_by_remaining() {
        let deadline = Deadline::after(Duration::from_secs(10));
        assert!(deadline.budget(Duration::from_secs(60)) <= Duration::from_secs(10));
        assert_eq!(
            deadline.budget(Duration::from_millis(5)),
            Duration::from_millis(5)
        );
        assert_eq!(deadline.total(), Duration::from_secs(10));
        assert!(!deadline.is_expired());
    }

    #[tokio::test]
    async fn test_expired_deadline_has_zero_budget() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert!(deadline.budget(Duration::from_secs(5)).is_zero());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shrinks_with_tokio_clock() {
        let deadline = Deadline::after(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(deadline.remaining(), Duration::from_millis(500));
        assert_eq!(
            deadline.budget(Duration::from_secs(120)),
            Duration::from_millis(500)
        );
    }
}
