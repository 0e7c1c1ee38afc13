//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use gateway_ledger::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::GatewayLedger;
pub use crate::Result;

// Budget enforcement
pub use crate::budget::{Admission, BudgetLedger, BudgetSummary};

// Pricing
pub use crate::pricing::{PricingEntry, PricingTable, PricingTableBuilder};

// Usage recording
pub use crate::usage::{ANONYMOUS_PRINCIPAL, Aggregate, NO_TEAM, UsageRecord, UsageRecorder};

// Chargeback reporting
pub use crate::chargeback::{ChargebackAggregator, ChargebackEntry, ChargebackReport};
