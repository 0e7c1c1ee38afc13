//! Per-principal budget enforcement.
//!
//! Admission checks are pure reads against an estimate; commits add actual
//! spend unconditionally. The pair is deliberately not atomic as a unit:
//! two concurrent requests for one principal may both pass admission before
//! either commits, so a transient overshoot of the limit is accepted policy.

mod ledger;

pub use ledger::{Admission, BudgetLedger, BudgetSummary};
