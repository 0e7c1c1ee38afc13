//! Chargeback reporting: sorted per-principal and per-team cost attribution.

mod report;

pub use report::{ChargebackAggregator, ChargebackEntry, ChargebackReport};
