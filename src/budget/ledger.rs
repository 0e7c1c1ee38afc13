use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Result, ensure_non_negative};

/// Outcome of a pre-flight admission check. Denial is a normal result, not
/// an error; callers surface it as an admission-control decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allowed,
    Denied { limit: Decimal, spent: Decimal },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::Denied { limit, spent } => Some(format!(
                "Budget exceeded. Limit: ${limit:.4}, Spent: ${spent:.4}"
            )),
        }
    }
}

#[derive(Debug)]
struct PrincipalBudget {
    limit: Decimal,
    spent: Decimal,
    team: Option<String>,
}

/// Per-principal spending limits and cumulative spend.
///
/// Principals unknown to the ledger are admitted unconditionally and their
/// commits are no-ops; only registered principals are budget-limited. Each
/// entry mutates under its map shard lock, so commits never lose updates,
/// while the check/commit pair stays intentionally non-atomic (see the
/// module docs).
#[derive(Debug, Clone, Default)]
pub struct BudgetLedger {
    principals: Arc<DashMap<String, PrincipalBudget>>,
}

impl BudgetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, principal: impl Into<String>, limit: Decimal) -> Result<()> {
        self.insert(principal.into(), limit, None)
    }

    pub fn register_with_team(
        &self,
        principal: impl Into<String>,
        limit: Decimal,
        team: impl Into<String>,
    ) -> Result<()> {
        self.insert(principal.into(), limit, Some(team.into()))
    }

    fn insert(&self, principal: String, limit: Decimal, team: Option<String>) -> Result<()> {
        ensure_non_negative(limit)?;
        self.principals.insert(
            principal,
            PrincipalBudget {
                limit,
                spent: Decimal::ZERO,
                team,
            },
        );
        Ok(())
    }

    /// Pure read: does the principal have room for `estimated_cost`?
    pub fn check_admission(&self, principal: &str, estimated_cost: Decimal) -> Result<Admission> {
        ensure_non_negative(estimated_cost)?;

        let Some(budget) = self.principals.get(principal) else {
            // Unknown principals are not budget-limited
            return Ok(Admission::Allowed);
        };

        if budget.spent + estimated_cost <= budget.limit {
            Ok(Admission::Allowed)
        } else {
            Ok(Admission::Denied {
                limit: budget.limit,
                spent: budget.spent,
            })
        }
    }

    /// Adds actual spend to a registered principal. Never rejects an
    /// over-limit commit: enforcement happens only at admission time, against
    /// an estimate. Unknown principals are a no-op and gain no entry.
    pub fn commit(&self, principal: &str, actual_cost: Decimal) -> Result<()> {
        ensure_non_negative(actual_cost)?;

        if let Some(mut budget) = self.principals.get_mut(principal) {
            budget.spent += actual_cost;
            tracing::debug!(
                principal,
                cost = %actual_cost,
                spent = %budget.spent,
                limit = %budget.limit,
                "spend committed"
            );
        }
        Ok(())
    }

    pub fn contains(&self, principal: &str) -> bool {
        self.principals.contains_key(principal)
    }

    pub fn limit(&self, principal: &str) -> Option<Decimal> {
        self.principals.get(principal).map(|b| b.limit)
    }

    pub fn spent(&self, principal: &str) -> Option<Decimal> {
        self.principals.get(principal).map(|b| b.spent)
    }

    pub fn remaining(&self, principal: &str) -> Option<Decimal> {
        self.principals
            .get(principal)
            .map(|b| (b.limit - b.spent).max(Decimal::ZERO))
    }

    pub fn team_of(&self, principal: &str) -> Option<String> {
        self.principals.get(principal).and_then(|b| b.team.clone())
    }

    pub fn principal_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.principals.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn summary(&self) -> Vec<BudgetSummary> {
        let mut rows: Vec<BudgetSummary> = self
            .principals
            .iter()
            .map(|e| BudgetSummary {
                principal: e.key().clone(),
                team: e.value().team.clone(),
                limit: e.value().limit,
                spent: e.value().spent,
                remaining: (e.value().limit - e.value().spent).max(Decimal::ZERO),
                is_exceeded: e.value().spent >= e.value().limit,
            })
            .collect();
        rows.sort_by(|a, b| a.principal.cmp(&b.principal));
        rows
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub principal: String,
    pub team: Option<String>,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub is_exceeded: bool,
}
