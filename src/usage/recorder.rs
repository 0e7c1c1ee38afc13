use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use rust_decimal::Decimal;

use super::record::{Aggregate, UsageRecord};
use crate::{Result, ensure_non_negative};

#[derive(Debug, Default)]
struct RecorderInner {
    records: Vec<UsageRecord>,
    by_principal: HashMap<String, Aggregate>,
    by_team: HashMap<String, Aggregate>,
    total_cost: Decimal,
}

/// Append-only log of completed requests plus running aggregates.
///
/// A single write lock covers the append, both aggregate updates, and the
/// running total, so no reader ever observes aggregates out of step with the
/// record sequence.
#[derive(Debug, Default)]
pub struct UsageRecorder {
    inner: RwLock<RecorderInner>,
}

impl UsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RecorderInner> {
        // writers only do arithmetic, so a poisoned lock still holds
        // consistent state
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RecorderInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record and updates the aggregates atomically. Absent
    /// identifiers are attributed to the `anonymous` / `none` buckets.
    pub fn record(
        &self,
        principal: Option<&str>,
        team: Option<&str>,
        input_tokens: u64,
        output_tokens: u64,
        cost: Decimal,
        elapsed: Duration,
    ) -> Result<()> {
        ensure_non_negative(cost)?;

        // the timestamp is captured under the write lock so that insertion
        // order and timestamp order agree
        let mut inner = self.write();
        let record = UsageRecord::new(principal, team, input_tokens, output_tokens, cost, elapsed);
        tracing::debug!(
            principal = %record.principal,
            team = %record.team,
            cost = %record.cost,
            input_tokens,
            output_tokens,
            "usage recorded"
        );
        inner
            .by_principal
            .entry(record.principal.clone())
            .or_default()
            .absorb(&record);
        inner
            .by_team
            .entry(record.team.clone())
            .or_default()
            .absorb(&record);
        inner.total_cost += record.cost;
        inner.records.push(record);
        Ok(())
    }

    /// Snapshot of all records in insertion (chronological) order.
    pub fn records(&self) -> Vec<UsageRecord> {
        self.read().records.clone()
    }

    pub fn request_count(&self) -> usize {
        self.read().records.len()
    }

    /// Running total maintained incrementally as records are appended.
    pub fn total_cost(&self) -> Decimal {
        self.read().total_cost
    }

    /// Fresh summation over the record sequence. Equal to
    /// [`total_cost`](Self::total_cost) by invariant; exposed for auditing.
    pub fn recompute_total_cost(&self) -> Decimal {
        self.read()
            .records
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc + r.cost)
    }

    pub fn aggregates_by_principal(&self) -> HashMap<String, Aggregate> {
        self.read().by_principal.clone()
    }

    pub fn aggregates_by_team(&self) -> HashMap<String, Aggregate> {
        self.read().by_team.clone()
    }
}
