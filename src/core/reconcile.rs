use crate::core::batch::PendingBatch;
use crate::domain::model::FlushResult;

/// Rows before the first data row (the header).
const HEADER_ROWS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Source row, header is row 1.
    pub row: usize,
    pub status: u16,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub items: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
}

impl Reconciliation {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Maps per-item outcomes of one flush back to source rows.
pub fn reconcile(result: &FlushResult, batch: &PendingBatch) -> Reconciliation {
    let items = &result.body.items;

    if items.len() != batch.len() {
        tracing::warn!(
            "Bulk response lists {} items for a batch of {} rows",
            items.len(),
            batch.len()
        );
    }

    if !result.body.errors {
        return Reconciliation {
            items: items.len(),
            succeeded: items.len(),
            failures: Vec::new(),
        };
    }

    let failures: Vec<ItemFailure> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.status().is_success())
        .map(|(local, item)| ItemFailure {
            row: batch
                .rows
                .get(local)
                .copied()
                .unwrap_or(batch.offset + local + HEADER_ROWS + 1),
            status: item.status().status,
            detail: item.status().error_detail(),
        })
        .collect();

    Reconciliation {
        items: items.len(),
        succeeded: items.len() - failures.len(),
        failures,
    }
}
