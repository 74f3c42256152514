//! Clinic Assistant Backend
//!
//! Task-orchestration core for a multi-tenant clinic service. Classifies a
//! natural-language task, executes a short ordered sequence of domain
//! actions (scheduling, billing lookup, document retrieval), and returns a
//! PHI-redacted, traceable result.
//!
//! The HTTP layer, embedding/seeding jobs, and the retrieval service's
//! ranking algorithm are external collaborators; [`Orchestrator::run`] is
//! the only operation they consume.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod redaction;
pub mod retrieval;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use orchestrator::trace::{Agent, RunOutcome, TraceEntry};
pub use orchestrator::Orchestrator;
pub use redaction::Redactor;
pub use retrieval::{EvidenceHit, HttpRetrievalClient, RetrievalClient};
pub use store::DataGateway;
