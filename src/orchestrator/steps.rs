//! Step definitions and the step-execution state machine
//!
//! Each step is a transition over (tenant context, result accumulator)
//! producing an accumulator update and a trace entry. The `Step` enum is
//! closed and the executor matches it exhaustively, so an unrecognized
//! step cannot silently do nothing. Steps run strictly in plan order;
//! earlier accumulator writes are visible to later steps.

use crate::config::OrchestratorConfig;
use crate::error::AppError;
use crate::orchestrator::constants::{
    ANSWER_LEAD_IN, ANSWER_SEPARATOR, ANSWER_TOP_K, COVERAGE_SEPARATOR, COVERAGE_TOP_K,
    DEFAULT_PATIENT_NAME, DOCS_TOP_K,
};
use crate::orchestrator::trace::{to_trace_value, Agent, TraceEntry};
use crate::redaction::Redactor;
use crate::retrieval::{EvidenceHit, RetrievalClient};
use crate::store::models::Claim;
use crate::store::DataGateway;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Closed set of plan steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Read open slots for the tenant
    RetrieveAvailability,
    /// Select the earliest open slot as a draft
    ProposeSlot,
    /// Commit the drafted slot for the patient
    Confirm,
    /// Read the tenant's claims
    RetrieveClaims,
    /// Summarize coverage from retrieved evidence
    SummarizeCoverage,
    /// Retrieve relevant documents
    RetrieveDocs,
    /// Compose a redacted answer from retrieved evidence
    AnswerQuestion,
}

impl Step {
    /// Actor attributed in the trace for this step
    pub fn agent(&self) -> Agent {
        match self {
            Step::RetrieveAvailability | Step::ProposeSlot | Step::Confirm => Agent::Scheduler,
            Step::RetrieveClaims => Agent::Billing,
            Step::SummarizeCoverage | Step::RetrieveDocs => Agent::Retriever,
            Step::AnswerQuestion => Agent::Answerer,
        }
    }

    /// Step identifier as it appears in plans and traces
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::RetrieveAvailability => "retrieve_availability",
            Step::ProposeSlot => "propose_slot",
            Step::Confirm => "confirm",
            Step::RetrieveClaims => "retrieve_claims",
            Step::SummarizeCoverage => "summarize_coverage",
            Step::RetrieveDocs => "retrieve_docs",
            Step::AnswerQuestion => "answer_question",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tentatively proposed, not-yet-committed scheduling slot
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotDraft {
    /// No open slot exists for the tenant
    NoAvailability,
    /// Earliest open slot, selected but not committed
    Proposed {
        /// Start of the proposed slot, serialized as `start`
        #[serde(rename = "start")]
        start_time: DateTime<Utc>,
        /// Slot row to book on confirm
        slot_id: i64,
    },
}

/// Outcome of the confirm step
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Confirmation {
    /// The conditional booking update committed
    Confirmed {
        /// Slot that was booked
        slot_id: i64,
    },
    /// The slot was booked by someone else between propose and confirm
    Conflict {
        /// Slot that was lost
        slot_id: i64,
    },
}

/// Redacted coverage summary with its evidence
#[derive(Debug, Clone, Serialize)]
pub struct CoverageSummary {
    /// Evidence texts joined and passed through the redactor
    pub summary: String,
    /// The hits the summary was built from
    pub sources: Vec<EvidenceHit>,
}

/// Per-run result accumulator, keyed by step output.
///
/// Grows monotonically during one run and is scoped to that run; it is
/// never shared across requests.
#[derive(Debug, Default, Serialize)]
pub struct ResultAccumulator {
    /// Output of `propose_slot`
    pub draft: Option<SlotDraft>,
    /// Output of `confirm`
    pub confirmed: Option<Confirmation>,
    /// Output of `retrieve_claims`
    pub claims: Option<Vec<Claim>>,
    /// Output of `summarize_coverage`
    pub summary: Option<CoverageSummary>,
    /// Output of `retrieve_docs`
    pub hits: Option<Vec<EvidenceHit>>,
    /// Output of `answer_question`
    pub answer: Option<String>,
}

/// Immutable per-request context shared by every step
pub(crate) struct StepContext<'a> {
    /// Original task text (also used as the retrieval query)
    pub task: &'a str,
    /// Tenant whose data the run may touch
    pub tenant_id: &'a str,
    /// Patient to book for; defaults to [`DEFAULT_PATIENT_NAME`]
    pub patient_name: Option<&'a str>,
}

/// Execute one step against the accumulator.
///
/// Returns `Ok(Some(entry))` for a meaningfully-executed step,
/// `Ok(None)` when the step's precondition is unmet and it skips by
/// policy (confirm without a draft), and `Err` for faults the caller
/// isolates into an error trace entry.
pub(crate) async fn execute_step(
    step: Step,
    ctx: &StepContext<'_>,
    gateway: &DataGateway,
    retrieval: &dyn RetrievalClient,
    redactor: &Redactor,
    limits: &OrchestratorConfig,
    acc: &mut ResultAccumulator,
) -> Result<Option<TraceEntry>, AppError> {
    tracing::debug!(step = %step, tenant_id = %ctx.tenant_id, "Executing step");

    let entry = match step {
        Step::RetrieveAvailability => {
            let slots = gateway
                .list_open_slots(ctx.tenant_id, limits.lookup_limit)
                .await?;
            TraceEntry {
                agent: step.agent(),
                output: to_trace_value(&slots)?,
            }
        }

        Step::ProposeSlot => {
            // Re-read availability: the earlier listing is advisory and
            // may be stale by the time a draft is cut.
            let slots = gateway
                .list_open_slots(ctx.tenant_id, limits.lookup_limit)
                .await?;
            let draft = match slots.first() {
                Some(slot) => SlotDraft::Proposed {
                    start_time: slot.start_time,
                    slot_id: slot.id,
                },
                None => SlotDraft::NoAvailability,
            };
            let output = to_trace_value(&draft)?;
            acc.draft = Some(draft);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }

        Step::Confirm => {
            // Skip-if-precondition-unmet policy: without a drafted slot
            // there is nothing to commit and nothing trace-worthy.
            let slot_id = match acc.draft {
                Some(SlotDraft::Proposed { slot_id, .. }) => slot_id,
                _ => return Ok(None),
            };
            let patient_name = ctx.patient_name.unwrap_or(DEFAULT_PATIENT_NAME);

            let confirmation = match gateway
                .book_slot(slot_id, ctx.tenant_id, patient_name)
                .await
            {
                Ok(()) => Confirmation::Confirmed { slot_id },
                Err(AppError::SlotConflict(slot_id)) => {
                    tracing::warn!(
                        slot_id = slot_id,
                        tenant_id = %ctx.tenant_id,
                        "Slot was booked between propose and confirm"
                    );
                    Confirmation::Conflict { slot_id }
                }
                Err(other) => return Err(other),
            };
            let output = to_trace_value(&confirmation)?;
            acc.confirmed = Some(confirmation);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }

        Step::RetrieveClaims => {
            let claims = gateway
                .list_claims(ctx.tenant_id, None, limits.lookup_limit)
                .await?;
            let output = to_trace_value(&claims)?;
            acc.claims = Some(claims);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }

        Step::SummarizeCoverage => {
            let hits = retrieval
                .retrieve(ctx.task, ctx.tenant_id, COVERAGE_TOP_K)
                .await?;
            let joined = hits
                .iter()
                .map(|h| h.text.as_str())
                .collect::<Vec<_>>()
                .join(COVERAGE_SEPARATOR);
            let summary = CoverageSummary {
                summary: redactor.redact(&joined),
                sources: hits,
            };
            let output = to_trace_value(&summary)?;
            acc.summary = Some(summary);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }

        Step::RetrieveDocs => {
            let hits = retrieval
                .retrieve(ctx.task, ctx.tenant_id, DOCS_TOP_K)
                .await?;
            let output = to_trace_value(&hits)?;
            acc.hits = Some(hits);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }

        Step::AnswerQuestion => {
            let hits = retrieval
                .retrieve(ctx.task, ctx.tenant_id, ANSWER_TOP_K)
                .await?;
            let joined = hits
                .iter()
                .map(|h| h.text.as_str())
                .collect::<Vec<_>>()
                .join(ANSWER_SEPARATOR);
            let answer = redactor.redact(&format!("{}{}", ANSWER_LEAD_IN, joined));
            let output = serde_json::Value::String(answer.clone());
            acc.answer = Some(answer);
            TraceEntry {
                agent: step.agent(),
                output,
            }
        }
    };

    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_identifiers_are_snake_case() {
        assert_eq!(
            serde_json::to_value(Step::RetrieveAvailability).unwrap(),
            json!("retrieve_availability")
        );
        assert_eq!(Step::ProposeSlot.as_str(), "propose_slot");
        assert_eq!(Step::AnswerQuestion.to_string(), "answer_question");
    }

    #[test]
    fn test_step_agent_attribution() {
        assert_eq!(Step::RetrieveAvailability.agent(), Agent::Scheduler);
        assert_eq!(Step::ProposeSlot.agent(), Agent::Scheduler);
        assert_eq!(Step::Confirm.agent(), Agent::Scheduler);
        assert_eq!(Step::RetrieveClaims.agent(), Agent::Billing);
        assert_eq!(Step::SummarizeCoverage.agent(), Agent::Retriever);
        assert_eq!(Step::RetrieveDocs.agent(), Agent::Retriever);
        assert_eq!(Step::AnswerQuestion.agent(), Agent::Answerer);
    }

    #[test]
    fn test_draft_serializes_with_status_tag() {
        let draft = SlotDraft::NoAvailability;
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"status": "no_availability"})
        );

        let draft = SlotDraft::Proposed {
            start_time: "2026-03-01T09:00:00Z".parse().unwrap(),
            slot_id: 7,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["status"], "proposed");
        assert_eq!(value["slot_id"], 7);
        // The timestamp key is part of the trace contract the HTTP layer reads
        assert!(value.get("start").is_some());
        assert!(value.get("start_time").is_none());
    }

    #[test]
    fn test_confirmation_serializes_with_status_tag() {
        let value = serde_json::to_value(Confirmation::Confirmed { slot_id: 3 }).unwrap();
        assert_eq!(value, json!({"status": "confirmed", "slot_id": 3}));

        let value = serde_json::to_value(Confirmation::Conflict { slot_id: 3 }).unwrap();
        assert_eq!(value, json!({"status": "conflict", "slot_id": 3}));
    }

    #[test]
    fn test_accumulator_starts_empty() {
        let acc = ResultAccumulator::default();
        assert!(acc.draft.is_none());
        assert!(acc.confirmed.is_none());
        assert!(acc.claims.is_none());
        assert!(acc.summary.is_none());
        assert!(acc.hits.is_none());
        assert!(acc.answer.is_none());
    }
}
