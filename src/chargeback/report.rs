use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::usage::{Aggregate, UsageRecorder};

/// One row of a chargeback table: the attribution key (principal or team)
/// and its aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargebackEntry {
    pub key: String,
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Decimal,
}

impl ChargebackEntry {
    fn from_aggregate(key: String, aggregate: &Aggregate) -> Self {
        Self {
            key,
            requests: aggregate.requests,
            input_tokens: aggregate.input_tokens,
            output_tokens: aggregate.output_tokens,
            cost: aggregate.cost,
        }
    }
}

/// Read-only view over a [`UsageRecorder`]. Every call returns a snapshot of
/// the recorder's state at that moment; later records do not retroactively
/// change an already-returned result.
#[derive(Debug, Clone, Copy)]
pub struct ChargebackAggregator<'a> {
    recorder: &'a UsageRecorder,
}

impl<'a> ChargebackAggregator<'a> {
    pub fn new(recorder: &'a UsageRecorder) -> Self {
        Self { recorder }
    }

    /// Per-principal aggregates, ordered by descending cost (ties broken by
    /// identifier ascending, for determinism).
    pub fn per_principal(&self) -> Vec<ChargebackEntry> {
        Self::sorted_entries(self.recorder.aggregates_by_principal())
    }

    /// Per-team aggregates, same ordering rule. Records without a team land
    /// in the `none` bucket.
    pub fn per_team(&self) -> Vec<ChargebackEntry> {
        Self::sorted_entries(self.recorder.aggregates_by_team())
    }

    /// Column-wise sum across all entries; the report's totals row.
    pub fn totals(&self) -> Aggregate {
        let mut totals = Aggregate::default();
        for aggregate in self.recorder.aggregates_by_principal().values() {
            totals.accumulate(aggregate);
        }
        totals
    }

    pub fn report(&self) -> ChargebackReport {
        ChargebackReport {
            generated_at: Utc::now(),
            per_principal: self.per_principal(),
            per_team: self.per_team(),
            totals: self.totals(),
        }
    }

    fn sorted_entries(aggregates: HashMap<String, Aggregate>) -> Vec<ChargebackEntry> {
        let mut entries: Vec<ChargebackEntry> = aggregates
            .iter()
            .map(|(key, aggregate)| ChargebackEntry::from_aggregate(key.clone(), aggregate))
            .collect();
        entries.sort_by(|a, b| b.cost.cmp(&a.cost).then_with(|| a.key.cmp(&b.key)));
        entries
    }
}

/// Serializable chargeback report: the data behind the rendered table, not
/// the rendering itself.
#[derive(Debug, Clone, Serialize)]
pub struct ChargebackReport {
    pub generated_at: DateTime<Utc>,
    pub per_principal: Vec<ChargebackEntry>,
    pub per_team: Vec<ChargebackEntry>,
    pub totals: Aggregate,
}
