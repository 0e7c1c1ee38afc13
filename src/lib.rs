//! # gateway-ledger
//!
//! Budget enforcement and cost-attribution ledger for LLM API gateways.
//!
//! This crate provides the in-memory accounting core behind a gateway's cost
//! controls: pre-flight admission checks against per-principal spending
//! limits, post-flight commit of actual spend, an append-only usage log with
//! running aggregates, and chargeback reporting by principal and by team.
//! Transport, provider payloads, and report formatting live outside this
//! crate; callers invoke the ledger synchronously before and after their own
//! HTTP calls.
//!
//! ## Quick Start
//!
//! ```rust
//! use gateway_ledger::GatewayLedger;
//! use rust_decimal_macros::dec;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), gateway_ledger::Error> {
//!     let ledger = GatewayLedger::default();
//!     ledger.register_principal_with_team("alice", dec!(0.05), "engineering")?;
//!
//!     let admission = ledger.admit(Some("alice"), "anthropic", "claude-haiku-4-5")?;
//!     if admission.is_allowed() {
//!         // ... perform the external request, observe actual token counts ...
//!         let cost = ledger.settle(
//!             Some("alice"),
//!             "anthropic",
//!             "claude-haiku-4-5",
//!             120,
//!             340,
//!             Duration::from_millis(800),
//!         )?;
//!         println!("charged ${cost}");
//!     }
//!
//!     for entry in ledger.chargeback().per_team() {
//!         println!("{}: {} requests, ${}", entry.key, entry.requests, entry.cost);
//!     }
//!     Ok(())
//! }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod budget;
pub mod chargeback;
pub mod ledger;
pub mod prelude;
pub mod pricing;
pub mod usage;

// Re-exports for convenience
pub use budget::{Admission, BudgetLedger, BudgetSummary};
pub use chargeback::{ChargebackAggregator, ChargebackEntry, ChargebackReport};
pub use ledger::GatewayLedger;
pub use pricing::{PricingEntry, PricingTable, PricingTableBuilder};
pub use usage::{ANONYMOUS_PRINCIPAL, Aggregate, NO_TEAM, UsageRecord, UsageRecorder};

use rust_decimal::Decimal;

/// Error type for gateway-ledger operations.
///
/// Admission denial is not an error: [`Admission::Denied`] is a normal
/// outcome returned by value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Cost calculation requested for a provider absent from the pricing table.
    #[error("unknown provider '{provider}' in pricing table")]
    UnknownProvider { provider: String },

    /// A negative monetary amount was supplied where only non-negative values are valid.
    #[error("invalid cost {value}: monetary amounts must be non-negative")]
    InvalidCost { value: Decimal },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        Error::UnknownProvider {
            provider: provider.into(),
        }
    }

    pub fn invalid_cost(value: Decimal) -> Self {
        Error::InvalidCost { value }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejects negative monetary amounts before any state is touched.
pub(crate) fn ensure_non_negative(value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::invalid_cost(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_cost_rejected() {
        assert!(matches!(
            ensure_non_negative(dec!(-0.01)),
            Err(Error::InvalidCost { .. })
        ));
        assert!(ensure_non_negative(dec!(0)).is_ok());
        assert!(ensure_non_negative(dec!(1000)).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = Error::unknown_provider("mistral");
        assert_eq!(
            err.to_string(),
            "unknown provider 'mistral' in pricing table"
        );

        let err = Error::invalid_cost(dec!(-1.5));
        assert!(err.to_string().contains("-1.5"));
    }
}
