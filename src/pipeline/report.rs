//! Reconciliation run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LocalId;

/// What happened to a single article.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
}

/// A mutation applied during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub local_id: LocalId,
    pub external_id: String,
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "local_id", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A record was created; carries its id
    Created(LocalId),
    /// A record was updated; carries its id
    Updated(LocalId),
    /// No article qualified for a create or update
    Unchanged,
    /// No category mappings are configured, so nothing was attempted
    NotConfigured,
}

impl RunOutcome {
    /// Id of the record the run created or updated, if any.
    pub fn local_id(&self) -> Option<LocalId> {
        match self {
            RunOutcome::Created(id) | RunOutcome::Updated(id) => Some(*id),
            RunOutcome::Unchanged | RunOutcome::NotConfigured => None,
        }
    }
}

/// Statistics and result of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub changes: Vec<Change>,
    /// Well-formed articles in the payload
    pub articles_seen: usize,
    /// Articles the loop looked at before stopping
    pub articles_processed: usize,
    /// Existing records left alone because they were edited locally
    pub skipped_edited: usize,
    /// Tags whose record no longer exists
    pub skipped_orphaned: usize,
    /// Articles whose category code had no mapping
    pub uncategorized: usize,
    /// Feed items dropped for missing required fields
    pub malformed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            outcome: RunOutcome::Unchanged,
            changes: Vec::new(),
            articles_seen: 0,
            articles_processed: 0,
            skipped_edited: 0,
            skipped_orphaned: 0,
            uncategorized: 0,
            malformed: 0,
            started_at,
            finished_at: started_at,
        }
    }

    /// Record a mutation. The first one becomes the run outcome.
    pub fn push_change(&mut self, change: Change) {
        if self.changes.is_empty() {
            self.outcome = match change.kind {
                ChangeKind::Created => RunOutcome::Created(change.local_id),
                ChangeKind::Updated => RunOutcome::Updated(change.local_id),
            };
        }
        self.changes.push(change);
    }

    pub fn created_count(&self) -> usize {
        self.count(ChangeKind::Created)
    }

    pub fn updated_count(&self) -> usize {
        self.count(ChangeKind::Updated)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Summary rows for console output.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let outcome = match self.outcome {
            RunOutcome::Created(id) => format!("created #{id}"),
            RunOutcome::Updated(id) => format!("updated #{id}"),
            RunOutcome::Unchanged => "no changes".to_string(),
            RunOutcome::NotConfigured => "not configured".to_string(),
        };

        vec![
            ("Outcome", outcome),
            ("Articles in feed", self.articles_seen.to_string()),
            ("Articles processed", self.articles_processed.to_string()),
            ("Created", self.created_count().to_string()),
            ("Updated", self.updated_count().to_string()),
            ("Skipped (edited)", self.skipped_edited.to_string()),
            ("Skipped (orphaned tag)", self.skipped_orphaned.to_string()),
            ("Uncategorized", self.uncategorized.to_string()),
            ("Malformed", self.malformed.to_string()),
            ("Duration", format!("{} ms", self.duration_ms())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(kind: ChangeKind, id: LocalId) -> Change {
        Change {
            kind,
            local_id: id,
            external_id: format!("ext-{id}"),
        }
    }

    #[test]
    fn test_first_change_sets_outcome() {
        let mut report = RunReport::new(Utc::now());
        assert_eq!(report.outcome, RunOutcome::Unchanged);

        report.push_change(change(ChangeKind::Updated, 4));
        report.push_change(change(ChangeKind::Created, 9));

        assert_eq!(report.outcome, RunOutcome::Updated(4));
        assert_eq!(report.outcome.local_id(), Some(4));
        assert_eq!(report.created_count(), 1);
        assert_eq!(report.updated_count(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(RunOutcome::Created(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "created", "local_id": 3 }));

        let json = serde_json::to_value(RunOutcome::Unchanged).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unchanged" }));
    }
}
