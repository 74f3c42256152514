//! Trace and summary building
//!
//! The trace is the authoritative, ordered record of one orchestration
//! run: one entry per meaningfully-executed step, plus the planner's own
//! output as the first entry. The final summary is a deliberately lossy
//! one-line rendering of the trace for display.

use crate::error::AppError;
use crate::orchestrator::constants::SUMMARY_SEPARATOR;
use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;

/// Conceptual actor that produced a trace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Agent {
    /// Intent classification
    Planner,
    /// Availability and booking steps
    Scheduler,
    /// Claim lookups
    Billing,
    /// Evidence retrieval and summarization
    Retriever,
    /// Answer composition
    Answerer,
}

/// One step's record in the run trace
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    /// Actor that produced the output
    pub agent: Agent,
    /// Arbitrary step result, serialized
    pub output: Value,
}

/// Result of one orchestration run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Ordered per-step record; the authoritative output
    pub trace: Vec<TraceEntry>,
    /// Lossy one-line rendering of the trace
    pub final_summary: String,
}

/// Serialize a step output for the trace
pub(crate) fn to_trace_value<T: Serialize>(output: &T) -> Result<Value, AppError> {
    serde_json::to_value(output)
        .map_err(|e| AppError::Internal(anyhow!("Failed to encode step output: {}", e)))
}

/// Render the lossy one-line summary of a trace.
///
/// Per entry: the text itself when the output is a string, only the first
/// element when it is a sequence (truncation by design), and a compact
/// JSON rendering otherwise. Consumers that need the full record must read
/// the trace.
pub fn render_final_summary(trace: &[TraceEntry]) -> String {
    trace
        .iter()
        .map(|entry| render_output(&entry.output))
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

fn render_output(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        Value::Array(items) => match items.first() {
            Some(first) => first.to_string(),
            None => "[]".to_string(),
        },
        other => other.to_string(),
    }
}
