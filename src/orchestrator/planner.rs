//! Intent planner
//!
//! Maps free-text task descriptions to an ordered step list. This is pure
//! keyword classification over the lower-cased task text, first match
//! wins, checked in fixed priority order: scheduling beats billing beats
//! the retrieval fallback. The plan is never empty.

use crate::orchestrator::steps::Step;

/// Keywords that select the scheduling plan
const SCHEDULING_KEYWORDS: &[&str] = &["appointment", "book", "schedule"];

/// Keywords that select the billing plan
const BILLING_KEYWORDS: &[&str] = &["claim", "coverage", "insurance"];

/// Classify a task into its ordered step sequence
pub fn plan(task: &str) -> Vec<Step> {
    let task = task.to_lowercase();

    if SCHEDULING_KEYWORDS.iter().any(|k| task.contains(k)) {
        vec![Step::RetrieveAvailability, Step::ProposeSlot, Step::Confirm]
    } else if BILLING_KEYWORDS.iter().any(|k| task.contains(k)) {
        vec![Step::RetrieveClaims, Step::SummarizeCoverage]
    } else {
        vec![Step::RetrieveDocs, Step::AnswerQuestion]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduling_keywords_produce_scheduling_plan() {
        for task in [
            "book a cleaning",
            "I need an appointment next week",
            "can you schedule me in",
        ] {
            assert_eq!(
                plan(task),
                vec![Step::RetrieveAvailability, Step::ProposeSlot, Step::Confirm],
                "task: {}",
                task
            );
        }
    }

    #[test]
    fn test_billing_keywords_produce_billing_plan() {
        for task in [
            "what is my claim status",
            "how much coverage do I have",
            "does my insurance pay for this",
        ] {
            assert_eq!(
                plan(task),
                vec![Step::RetrieveClaims, Step::SummarizeCoverage],
                "task: {}",
                task
            );
        }
    }

    #[test]
    fn test_unmatched_task_falls_back_to_retrieval_plan() {
        for task in ["tell me about fluoride", "", "what are your opening hours"] {
            assert_eq!(
                plan(task),
                vec![Step::RetrieveDocs, Step::AnswerQuestion],
                "task: {}",
                task
            );
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(
            plan("BOOK AN APPOINTMENT"),
            vec![Step::RetrieveAvailability, Step::ProposeSlot, Step::Confirm]
        );
        assert_eq!(
            plan("My INSURANCE Claim"),
            vec![Step::RetrieveClaims, Step::SummarizeCoverage]
        );
    }

    #[test]
    fn test_scheduling_wins_over_billing_when_both_match() {
        assert_eq!(
            plan("book an appointment about my insurance claim"),
            vec![Step::RetrieveAvailability, Step::ProposeSlot, Step::Confirm]
        );
    }

    #[test]
    fn test_plan_is_never_empty() {
        for task in ["", "x", "zzzzz", "schedule", "coverage"] {
            assert!(!plan(task).is_empty(), "task: {}", task);
        }
    }
}
