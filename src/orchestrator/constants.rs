//! Orchestrator constants
//!
//! Fixed values of the step contracts. These are part of the observable
//! behavior (trace and summary contents), not tunables, which is why they
//! live here instead of in `Config`.

/// Result count requested for document retrieval
pub const DOCS_TOP_K: usize = 5;

/// Result count requested when answering a question
pub const ANSWER_TOP_K: usize = 3;

/// Result count requested when summarizing coverage
pub const COVERAGE_TOP_K: usize = 3;

/// Lead-in phrase prepended to composed answers
pub const ANSWER_LEAD_IN: &str = "Based on documents: ";

/// Separator between evidence texts in a coverage summary
pub const COVERAGE_SEPARATOR: &str = "; ";

/// Separator between evidence texts in a composed answer
pub const ANSWER_SEPARATOR: &str = " ";

/// Patient name recorded when none is supplied with the request
pub const DEFAULT_PATIENT_NAME: &str = "anonymous";

/// Separator between rendered trace entries in the final summary
pub const SUMMARY_SEPARATOR: &str = " | ";
