//! Per-item outcomes for batch operations.
//!
//! A batch never stops on an item failure: each identifier gets its own
//! outcome and the caller decides what to do with the collected report.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{id}: {cause}")]
pub struct ItemFailure {
    pub id: String,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded { id: String, detail: String },
    Skipped { id: String, reason: String },
    Failed(ItemFailure),
}

impl ItemOutcome {
    pub fn id(&self) -> &str {
        match self {
            ItemOutcome::Succeeded { id, .. } | ItemOutcome::Skipped { id, .. } => id,
            ItemOutcome::Failed(failure) => &failure.id,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Succeeded { id, detail } => write!(f, "✅ {id}: {detail}"),
            ItemOutcome::Skipped { id, reason } => write!(f, "⏭️  {id}: {reason}"),
            ItemOutcome::Failed(failure) => write!(f, "❌ {failure}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&mut self, id: impl Into<String>, detail: impl Into<String>) {
        self.outcomes.push(ItemOutcome::Succeeded {
            id: id.into(),
            detail: detail.into(),
        });
    }

    pub fn skipped(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.outcomes.push(ItemOutcome::Skipped {
            id: id.into(),
            reason: reason.into(),
        });
    }

    pub fn failed(&mut self, id: impl Into<String>, cause: impl fmt::Display) {
        let failure = ItemFailure {
            id: id.into(),
            cause: cause.to_string(),
        };
        tracing::warn!(operation = %self.operation, id = %failure.id, cause = %failure.cause, "item failed");
        self.outcomes.push(ItemOutcome::Failed(failure));
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        if let ItemOutcome::Failed(failure) = &outcome {
            tracing::warn!(operation = %self.operation, id = %failure.id, cause = %failure.cause, "item failed");
        }
        self.outcomes.push(outcome);
    }

    /// Record failures found before any item ran, such as unparseable ids
    pub fn extend_failures(&mut self, failures: impl IntoIterator<Item = ItemFailure>) {
        for failure in failures {
            self.push(ItemOutcome::Failed(failure));
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> Vec<&ItemFailure> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Failed(failure) => Some(failure),
                _ => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Succeeded { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Skipped { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, ItemOutcome::Failed(_)))
    }

    /// One-line tally for the end of a run
    pub fn summary(&self) -> String {
        let elapsed = self
            .finished_at
            .map(|end| format!(" in {:.1}s", (end - self.started_at).num_milliseconds() as f64 / 1000.0))
            .unwrap_or_default();
        format!(
            "{}: {} succeeded, {} skipped, {} failed{}",
            self.operation,
            self.success_count(),
            self.skipped_count(),
            self.failures().len(),
            elapsed
        )
    }
}
