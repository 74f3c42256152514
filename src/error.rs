//! Error types and error handling for the application
//!
//! This module defines the error taxonomy for the orchestration core.
//! Normal domain conditions (no open slots, no claims, a skipped confirm)
//! are NOT errors; they surface as structured statuses inside the trace
//! and result accumulator. Errors here are reserved for connectivity
//! faults, booking conflicts, caller misuse, and unexpected failures.

use thiserror::Error;

/// Application-level error types
///
/// Each variant maps to one class of the error taxonomy. The orchestrator
/// isolates step-level errors into trace entries; only startup and
/// validation faults propagate out of the public API.
#[derive(Error, Debug)]
pub enum AppError {
    /// Backing store or retrieval service could not be reached
    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    /// Conditional booking update found the slot already booked (or gone)
    #[error("Slot {0} is already booked")]
    SlotConflict(i64),

    /// Task text failed validation (empty, or over the configured cap)
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Internal error (catch-all for unexpected errors)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable kind, used when folding a step failure into
    /// a trace entry.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connectivity(_) => "connectivity",
            AppError::SlotConflict(_) => "conflict",
            AppError::InvalidTask(_) => "invalid_task",
            AppError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(AppError::Connectivity("db down".into()).kind(), "connectivity");
        assert_eq!(AppError::SlotConflict(7).kind(), "conflict");
        assert_eq!(AppError::InvalidTask("empty".into()).kind(), "invalid_task");
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).kind(),
            "internal"
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = AppError::SlotConflict(42);
        assert!(err.to_string().contains("42"));

        let err = AppError::Connectivity("store unreachable".into());
        assert!(err.to_string().contains("store unreachable"));
    }
}
