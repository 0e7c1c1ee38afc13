use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attribution key for requests without a principal identifier.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";
/// Attribution key for requests without a team identifier.
pub const NO_TEAM: &str = "none";

/// One completed request. Immutable once created; the recorder appends these
/// in chronological order and never reorders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub principal: String,
    pub team: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Decimal,
    pub elapsed: Duration,
}

impl UsageRecord {
    pub(crate) fn new(
        principal: Option<&str>,
        team: Option<&str>,
        input_tokens: u64,
        output_tokens: u64,
        cost: Decimal,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            principal: principal.unwrap_or(ANONYMOUS_PRINCIPAL).to_string(),
            team: team.unwrap_or(NO_TEAM).to_string(),
            input_tokens,
            output_tokens,
            cost,
            elapsed,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Derived (count, tokens, cost) summary over a set of usage records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Decimal,
}

impl Aggregate {
    pub(crate) fn absorb(&mut self, record: &UsageRecord) {
        self.requests += 1;
        self.input_tokens += record.input_tokens;
        self.output_tokens += record.output_tokens;
        self.cost += record.cost;
    }

    pub(crate) fn accumulate(&mut self, other: &Aggregate) {
        self.requests += other.requests;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cost += other.cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_absent_identifiers_get_sentinels() {
        let record = UsageRecord::new(None, None, 100, 50, dec!(0.00012), Duration::from_millis(500));
        assert_eq!(record.principal, ANONYMOUS_PRINCIPAL);
        assert_eq!(record.team, NO_TEAM);
        assert_eq!(record.total_tokens(), 150);
    }

    #[test]
    fn test_aggregate_absorb() {
        let mut agg = Aggregate::default();
        let record = UsageRecord::new(
            Some("alice"),
            Some("engineering"),
            200,
            80,
            dec!(0.01),
            Duration::from_secs(1),
        );
        agg.absorb(&record);
        agg.absorb(&record);

        assert_eq!(agg.requests, 2);
        assert_eq!(agg.input_tokens, 400);
        assert_eq!(agg.output_tokens, 160);
        assert_eq!(agg.cost, dec!(0.02));
    }

    #[test]
    fn test_record_serializes() {
        let record = UsageRecord::new(
            Some("alice"),
            Some("engineering"),
            10,
            20,
            dec!(0.001),
            Duration::from_millis(250),
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: UsageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
