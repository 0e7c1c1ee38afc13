//! Provider and model pricing for cost calculation.
//!
//! Rates are expressed in USD per million tokens. Unknown models fall back to
//! their provider's default entry; unknown providers are a configuration
//! error surfaced to the caller.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod entry;
mod table;

pub use entry::PricingEntry;
pub use table::{
    ESTIMATE_INPUT_TOKENS, ESTIMATE_OUTPUT_TOKENS, PricingTable, PricingTableBuilder,
};

/// Token denominator for per-MTok rates.
pub(crate) const TOKENS_PER_MTOK: Decimal = dec!(1_000_000);
