//! Fleet-level summaries over a snapshot of unit records

use serde::Serialize;
use std::collections::BTreeMap;

use super::classifier::{StatusClassifier, StatusKind};
use crate::types::UnitRecord;

/// Unit ids grouped by status, each list in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBuckets {
    pub ok: Vec<String>,
    pub due_soon: Vec<String>,
    pub overdue: Vec<String>,
}

impl StatusBuckets {
    pub fn ids(&self, kind: StatusKind) -> &[String] {
        match kind {
            StatusKind::Ok => &self.ok,
            StatusKind::DueSoon => &self.due_soon,
            StatusKind::Overdue => &self.overdue,
        }
    }

    fn push(&mut self, kind: StatusKind, id: String) {
        match kind {
            StatusKind::Ok => self.ok.push(id),
            StatusKind::DueSoon => self.due_soon.push(id),
            StatusKind::Overdue => self.overdue.push(id),
        }
    }
}

/// Snapshot summary consumed by dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Number of units in the snapshot
    pub total: usize,

    /// Unit ids per status
    pub buckets: StatusBuckets,

    /// Every filter category seen in the fleet → ids flagged as expiring
    pub filters: BTreeMap<String, Vec<String>>,
}

impl FleetSummary {
    pub fn count(&self, kind: StatusKind) -> usize {
        self.buckets.ids(kind).len()
    }

    pub fn ids(&self, kind: StatusKind) -> &[String] {
        self.buckets.ids(kind)
    }

    /// True when any unit is overdue or due soon.
    pub fn has_alerts(&self) -> bool {
        self.count(StatusKind::Overdue) + self.count(StatusKind::DueSoon) > 0
    }
}

/// Summarize a fleet snapshot in a single pass.
///
/// Id lists keep the order of `records`; the Presentation layer relies on
/// that to avoid rows jumping between refreshes.
pub fn summarize<'a, I>(records: I, classifier: &StatusClassifier) -> FleetSummary
where
    I: IntoIterator<Item = &'a UnitRecord>,
{
    let mut summary = FleetSummary::default();

    for record in records {
        summary.total += 1;
        summary
            .buckets
            .push(classifier.classify(record), record.id.clone());

        for (category, &expiring) in &record.filter_flags {
            let ids = summary.filters.entry(category.clone()).or_default();
            if expiring {
                ids.push(record.id.clone());
            }
        }
    }

    summary
}
