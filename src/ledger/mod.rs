//! The facade most callers use: pricing, budget, and usage recording wired
//! together as one owned, injectable store.
//!
//! Flow per request: [`admit`](GatewayLedger::admit) before the external
//! call, [`settle`](GatewayLedger::settle) after it completes with the actual
//! token counts. A caller that abandons a request simply never settles, which
//! leaves the spend counter untouched.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::Result;
use crate::budget::{Admission, BudgetLedger};
use crate::chargeback::ChargebackAggregator;
use crate::pricing::PricingTable;
use crate::usage::UsageRecorder;

#[derive(Debug, Default)]
pub struct GatewayLedger {
    pricing: PricingTable,
    budget: BudgetLedger,
    recorder: UsageRecorder,
}

impl GatewayLedger {
    /// Ledger with an injected pricing table. `GatewayLedger::default()`
    /// uses the built-in one.
    pub fn new(pricing: PricingTable) -> Self {
        Self {
            pricing,
            budget: BudgetLedger::new(),
            recorder: UsageRecorder::new(),
        }
    }

    pub fn register_principal(&self, principal: impl Into<String>, limit: Decimal) -> Result<()> {
        self.budget.register(principal, limit)
    }

    pub fn register_principal_with_team(
        &self,
        principal: impl Into<String>,
        limit: Decimal,
        team: impl Into<String>,
    ) -> Result<()> {
        self.budget.register_with_team(principal, limit, team)
    }

    /// Pre-flight admission check against the fixed-assumption cost estimate.
    /// Requests without a principal are always admitted.
    pub fn admit(
        &self,
        principal: Option<&str>,
        provider: &str,
        model: &str,
    ) -> Result<Admission> {
        let estimate = self.pricing.preflight_estimate(provider, model)?;
        let Some(principal) = principal else {
            return Ok(Admission::Allowed);
        };

        let admission = self.budget.check_admission(principal, estimate)?;
        if let Admission::Denied { limit, spent } = &admission {
            tracing::warn!(
                principal,
                estimate = %estimate,
                limit = %limit,
                spent = %spent,
                "admission denied over budget"
            );
        }
        Ok(admission)
    }

    /// Post-flight settlement: computes the actual cost, commits it against
    /// the principal's budget, and records usage attributed to the
    /// principal's registered team. Returns the cost charged.
    pub fn settle(
        &self,
        principal: Option<&str>,
        provider: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        elapsed: Duration,
    ) -> Result<Decimal> {
        let cost = self
            .pricing
            .cost(provider, model, input_tokens, output_tokens)?;

        if let Some(principal) = principal {
            self.budget.commit(principal, cost)?;
        }
        let team = principal.and_then(|p| self.budget.team_of(p));
        self.recorder.record(
            principal,
            team.as_deref(),
            input_tokens,
            output_tokens,
            cost,
            elapsed,
        )?;
        Ok(cost)
    }

    pub fn chargeback(&self) -> ChargebackAggregator<'_> {
        ChargebackAggregator::new(&self.recorder)
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn budget(&self) -> &BudgetLedger {
        &self.budget
    }

    pub fn recorder(&self) -> &UsageRecorder {
        &self.recorder
    }
}
