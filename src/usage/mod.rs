//! Append-only usage log with running per-principal and per-team aggregates.

mod record;
mod recorder;

pub use record::{ANONYMOUS_PRINCIPAL, Aggregate, NO_TEAM, UsageRecord};
pub use recorder::UsageRecorder;
