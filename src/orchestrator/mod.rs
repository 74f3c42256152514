//! Task orchestrator
//!
//! The sole entry point consumed by the HTTP layer. Owns no per-request
//! state: the orchestrator is constructed once with its collaborators and
//! reused across requests, while the accumulator and trace live entirely
//! inside each `run` call.

pub mod constants;
pub mod planner;
pub mod steps;
pub mod trace;

use crate::config::OrchestratorConfig;
use crate::error::AppError;
use crate::redaction::Redactor;
use crate::retrieval::RetrievalClient;
use crate::store::DataGateway;
use std::sync::Arc;
use steps::{execute_step, ResultAccumulator, StepContext};
use trace::{render_final_summary, to_trace_value, Agent, RunOutcome, TraceEntry};
use tracing::Instrument;
use uuid::Uuid;

/// Stateless orchestration service
pub struct Orchestrator {
    gateway: DataGateway,
    retrieval: Arc<dyn RetrievalClient>,
    redactor: Redactor,
    limits: OrchestratorConfig,
}

impl Orchestrator {
    /// Construct the service with its collaborators injected
    pub fn new(
        gateway: DataGateway,
        retrieval: Arc<dyn RetrievalClient>,
        redactor: Redactor,
        limits: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            retrieval,
            redactor,
            limits,
        }
    }

    /// Run one task end to end.
    ///
    /// Plans the task, executes the steps strictly in order, and folds the
    /// trace into a final summary. Normal domain conditions (no slots, no
    /// claims, a lost booking race) surface as structured statuses in the
    /// trace, never as errors; a step-level fault is captured as an error
    /// trace entry and the remaining steps still run. Only caller misuse
    /// (empty or oversized task) errors out here.
    pub async fn run(
        &self,
        task: &str,
        tenant_id: &str,
        patient_name: Option<&str>,
    ) -> Result<RunOutcome, AppError> {
        if task.trim().is_empty() {
            return Err(AppError::InvalidTask("task text is empty".to_string()));
        }
        if task.len() > self.limits.max_task_length {
            return Err(AppError::InvalidTask(format!(
                "task length {} exceeds maximum {}",
                task.len(),
                self.limits.max_task_length
            )));
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "orchestration",
            run_id = %run_id,
            tenant_id = %tenant_id,
        );

        self.run_steps(task, tenant_id, patient_name)
            .instrument(span)
            .await
    }

    async fn run_steps(
        &self,
        task: &str,
        tenant_id: &str,
        patient_name: Option<&str>,
    ) -> Result<RunOutcome, AppError> {
        let plan = planner::plan(task);
        tracing::info!(plan = ?plan, "Planned task");

        let mut trace = vec![TraceEntry {
            agent: Agent::Planner,
            output: to_trace_value(&plan)?,
        }];
        let mut acc = ResultAccumulator::default();
        let ctx = StepContext {
            task,
            tenant_id,
            patient_name,
        };

        for step in plan {
            match execute_step(
                step,
                &ctx,
                &self.gateway,
                self.retrieval.as_ref(),
                &self.redactor,
                &self.limits,
                &mut acc,
            )
            .await
            {
                Ok(Some(entry)) => trace.push(entry),
                Ok(None) => {
                    tracing::debug!(step = %step, "Step skipped: precondition unmet");
                }
                Err(e) => {
                    // Isolate the fault: record it and keep going. Steps
                    // that hard-depend on the failed one find their
                    // precondition unmet and skip.
                    tracing::warn!(step = %step, error = %e, "Step failed; continuing run");
                    trace.push(TraceEntry {
                        agent: step.agent(),
                        output: serde_json::json!({
                            "error": e.kind(),
                            "detail": e.to_string(),
                        }),
                    });
                }
            }
        }

        let final_summary = render_final_summary(&trace);
        tracing::info!(
            trace_len = trace.len(),
            summary_len = final_summary.len(),
            "Run completed"
        );

        Ok(RunOutcome {
            trace,
            final_summary,
        })
    }
}
