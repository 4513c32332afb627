use serde::{Deserialize, Serialize};

/// Result of writing one record into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Insert/update counters accumulated over a full fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub inserted: u64,
    pub updated: u64,
}

impl FetchSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

/// What reconciliation did with the commerce product for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// No product with this SKU existed; one was created.
    Imported,
    /// An existing product with this SKU was updated in place.
    Updated,
}

/// Per-record result of an import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Reconciled {
        external_id: String,
        action: ReconcileAction,
    },
    Failed {
        external_id: String,
        reason: String,
    },
}

/// Progress report for one import batch, shaped for a polling client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub imported: u64,
    pub updated: u64,
    /// One human-readable line per failed record.
    pub errors: Vec<String>,
    pub is_complete: bool,
    pub next_offset: u64,
    pub total_products: u64,
}

impl BatchReport {
    /// Empty report for the batch starting at `offset`.
    ///
    /// Completion depends only on the window, not on how many records in it
    /// succeeded: `offset + batch_size >= total`.
    #[must_use]
    pub fn new(offset: u64, batch_size: u64, total_products: u64) -> Self {
        let next_offset = offset.saturating_add(batch_size);
        Self {
            imported: 0,
            updated: 0,
            errors: Vec::new(),
            is_complete: next_offset >= total_products,
            next_offset,
            total_products,
        }
    }

    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Reconciled {
                action: ReconcileAction::Imported,
                ..
            } => self.imported += 1,
            RecordOutcome::Reconciled {
                action: ReconcileAction::Updated,
                ..
            } => self.updated += 1,
            RecordOutcome::Failed {
                external_id,
                reason,
            } => self
                .errors
                .push(format!("Error importing product {external_id}: {reason}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_complete_when_window_reaches_total() {
        assert!(!BatchReport::new(0, 10, 25).is_complete);
        assert!(!BatchReport::new(10, 10, 25).is_complete);
        assert!(BatchReport::new(20, 10, 25).is_complete);
        assert!(BatchReport::new(10, 10, 20).is_complete);
        assert!(BatchReport::new(0, 10, 0).is_complete);
    }

    #[test]
    fn next_offset_advances_by_batch_size() {
        assert_eq!(BatchReport::new(30, 10, 100).next_offset, 40);
    }

    #[test]
    fn record_tallies_outcomes() {
        let mut report = BatchReport::new(0, 10, 3);
        report.record(&RecordOutcome::Reconciled {
            external_id: "a".into(),
            action: ReconcileAction::Imported,
        });
        report.record(&RecordOutcome::Reconciled {
            external_id: "b".into(),
            action: ReconcileAction::Updated,
        });
        report.record(&RecordOutcome::Failed {
            external_id: "c".into(),
            reason: "boom".into(),
        });
        assert_eq!(report.imported, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.errors, vec!["Error importing product c: boom"]);
    }

    #[test]
    fn fetch_summary_counts_each_outcome() {
        let mut summary = FetchSummary::default();
        summary.record(UpsertOutcome::Inserted);
        summary.record(UpsertOutcome::Inserted);
        summary.record(UpsertOutcome::Updated);
        assert_eq!(
            summary,
            FetchSummary {
                inserted: 2,
                updated: 1
            }
        );
    }
}
