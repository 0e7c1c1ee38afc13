use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TOKENS_PER_MTOK;
use crate::{Result, ensure_non_negative};

/// Per-model unit costs, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub input_per_mtok: Decimal,
    pub output_per_mtok: Decimal,
}

impl PricingEntry {
    pub const fn new(input_per_mtok: Decimal, output_per_mtok: Decimal) -> Self {
        Self {
            input_per_mtok,
            output_per_mtok,
        }
    }

    /// Exact cost of a completed request:
    /// `input_tokens x input rate + output_tokens x output rate`.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> Decimal {
        let input = Decimal::from(input_tokens) * self.input_per_mtok / TOKENS_PER_MTOK;
        let output = Decimal::from(output_tokens) * self.output_per_mtok / TOKENS_PER_MTOK;
        input + output
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_non_negative(self.input_per_mtok)?;
        ensure_non_negative(self.output_per_mtok)
    }
}
