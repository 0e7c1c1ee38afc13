use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::entry::PricingEntry;
use crate::{Error, Result};

/// Token counts assumed by the pre-flight cost estimate.
///
/// The admission check runs before the prompt is sent, so it prices a fixed
/// assumed request shape rather than the actual one. Actual cost can exceed
/// the estimate; the budget ledger enforces only at admission time.
pub const ESTIMATE_INPUT_TOKENS: u64 = 15;
pub const ESTIMATE_OUTPUT_TOKENS: u64 = 100;

#[derive(Debug, Clone)]
struct ProviderPricing {
    models: HashMap<String, PricingEntry>,
    default: PricingEntry,
}

/// Immutable mapping from (provider, model) to unit costs.
///
/// Every provider carries a default entry, so a model lookup never fails once
/// the provider resolves. Provider and model names are case-insensitive.
#[derive(Debug, Clone)]
pub struct PricingTable {
    providers: HashMap<String, ProviderPricing>,
}

impl PricingTable {
    pub fn builder() -> PricingTableBuilder {
        PricingTableBuilder::new()
    }

    /// Resolves the pricing entry for a model, falling back to the provider
    /// default for models the table does not list.
    pub fn entry(&self, provider: &str, model: &str) -> Result<PricingEntry> {
        let pricing = self
            .providers
            .get(&provider.to_lowercase())
            .ok_or_else(|| Error::unknown_provider(provider))?;
        Ok(pricing
            .models
            .get(&model.to_lowercase())
            .copied()
            .unwrap_or(pricing.default))
    }

    /// Cost of a completed request. Side-effect free.
    pub fn cost(
        &self,
        provider: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<Decimal> {
        Ok(self
            .entry(provider, model)?
            .cost(input_tokens, output_tokens))
    }

    /// Pre-flight estimate priced at the fixed
    /// [`ESTIMATE_INPUT_TOKENS`]/[`ESTIMATE_OUTPUT_TOKENS`] assumption.
    pub fn preflight_estimate(&self, provider: &str, model: &str) -> Result<Decimal> {
        self.cost(provider, model, ESTIMATE_INPUT_TOKENS, ESTIMATE_OUTPUT_TOKENS)
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.providers.contains_key(&provider.to_lowercase())
    }

    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        PricingTableBuilder::new().with_defaults().assemble()
    }
}

#[derive(Debug, Default)]
pub struct PricingTableBuilder {
    models: HashMap<String, HashMap<String, PricingEntry>>,
    defaults: HashMap<String, PricingEntry>,
}

impl PricingTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Published rates for the providers the gateway routes to, per MTok.
    /// Haiku doubles as the Anthropic default; gpt-4o-mini as the OpenAI one.
    pub fn with_defaults(self) -> Self {
        self.model_rates("anthropic", "claude-haiku-4-5", dec!(0.80), dec!(4.00))
            .model_rates("anthropic", "claude-sonnet-4-5", dec!(3.00), dec!(15.00))
            .model_rates("anthropic", "claude-opus-4-1", dec!(15.00), dec!(75.00))
            .provider_default_rates("anthropic", dec!(0.80), dec!(4.00))
            .model_rates("openai", "gpt-4o-mini", dec!(0.15), dec!(0.60))
            .provider_default_rates("openai", dec!(0.15), dec!(0.60))
    }

    pub fn model(
        mut self,
        provider: impl Into<String>,
        model: impl Into<String>,
        entry: PricingEntry,
    ) -> Self {
        self.models
            .entry(provider.into().to_lowercase())
            .or_default()
            .insert(model.into().to_lowercase(), entry);
        self
    }

    pub fn model_rates(
        self,
        provider: impl Into<String>,
        model: impl Into<String>,
        input_per_mtok: Decimal,
        output_per_mtok: Decimal,
    ) -> Self {
        self.model(provider, model, PricingEntry::new(input_per_mtok, output_per_mtok))
    }

    pub fn provider_default(mut self, provider: impl Into<String>, entry: PricingEntry) -> Self {
        self.defaults.insert(provider.into().to_lowercase(), entry);
        self
    }

    pub fn provider_default_rates(
        self,
        provider: impl Into<String>,
        input_per_mtok: Decimal,
        output_per_mtok: Decimal,
    ) -> Self {
        self.provider_default(provider, PricingEntry::new(input_per_mtok, output_per_mtok))
    }

    /// Starts from [`with_defaults`](Self::with_defaults) and overrides
    /// provider defaults from `GATEWAY_PRICING_<PROVIDER>_INPUT` /
    /// `GATEWAY_PRICING_<PROVIDER>_OUTPUT` when both are set.
    pub fn from_env(mut self) -> Self {
        self = self.with_defaults();

        let providers: Vec<String> = self.defaults.keys().cloned().collect();
        for provider in providers {
            if let Some(entry) = Self::parse_env_entry(&provider) {
                self.defaults.insert(provider, entry);
            }
        }

        self
    }

    fn parse_env_entry(provider: &str) -> Option<PricingEntry> {
        let key = provider.to_uppercase().replace('-', "_");
        let input = std::env::var(format!("GATEWAY_PRICING_{key}_INPUT"))
            .ok()?
            .parse::<Decimal>()
            .ok()?;
        let output = std::env::var(format!("GATEWAY_PRICING_{key}_OUTPUT"))
            .ok()?
            .parse::<Decimal>()
            .ok()?;
        Some(PricingEntry::new(input, output))
    }

    /// Fails fast on malformed configuration: negative rates, or a provider
    /// that lists models without a default entry to fall back to.
    pub fn build(self) -> Result<PricingTable> {
        for entry in self.defaults.values() {
            entry.validate()?;
        }
        for (provider, models) in &self.models {
            if !self.defaults.contains_key(provider) {
                return Err(Error::Config(format!(
                    "provider '{provider}' has model pricing but no default entry"
                )));
            }
            for entry in models.values() {
                entry.validate()?;
            }
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> PricingTable {
        let Self {
            mut models,
            defaults,
        } = self;
        let providers = defaults
            .into_iter()
            .map(|(provider, default)| {
                let models = models.remove(&provider).unwrap_or_default();
                (provider, ProviderPricing { models, default })
            })
            .collect();
        PricingTable { providers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_lookups() {
        let table = PricingTable::default();

        let cost = table
            .cost("anthropic", "claude-haiku-4-5", 1_000_000, 1_000_000)
            .unwrap();
        assert_eq!(cost, dec!(4.80));

        let cost = table.cost("openai", "gpt-4o-mini", 1_000_000, 0).unwrap();
        assert_eq!(cost, dec!(0.15));
    }

    #[test]
    fn test_unknown_model_falls_back_to_provider_default() {
        let table = PricingTable::default();

        let listed = table.cost("openai", "gpt-4o-mini", 500, 500).unwrap();
        let unlisted = table.cost("openai", "gpt-5-nano", 500, 500).unwrap();
        assert_eq!(listed, unlisted);
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let table = PricingTable::default();
        let err = table.cost("mistral", "mistral-small", 10, 10).unwrap_err();
        assert!(matches!(err, Error::UnknownProvider { provider } if provider == "mistral"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = PricingTable::default();
        let lower = table.entry("anthropic", "claude-opus-4-1").unwrap();
        let upper = table.entry("Anthropic", "Claude-Opus-4-1").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_preflight_estimate_uses_fixed_token_assumption() {
        let table = PricingTable::default();

        // 15 x $0.80/MTok + 100 x $4.00/MTok
        let estimate = table
            .preflight_estimate("anthropic", "claude-haiku-4-5")
            .unwrap();
        assert_eq!(estimate, dec!(0.000412));
    }

    #[test]
    fn test_build_rejects_provider_without_default() {
        let err = PricingTableBuilder::new()
            .model_rates("groq", "llama-3.3-70b", dec!(0.59), dec!(0.79))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_build_rejects_negative_rates() {
        let err = PricingTableBuilder::new()
            .provider_default_rates("anthropic", dec!(-0.80), dec!(4.00))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCost { .. }));
    }

    #[test]
    fn test_custom_table() {
        let table = PricingTableBuilder::new()
            .provider_default_rates("local", dec!(0), dec!(0))
            .model_rates("local", "llama", dec!(0.10), dec!(0.20))
            .build()
            .unwrap();

        assert_eq!(table.cost("local", "llama", 1_000_000, 0).unwrap(), dec!(0.10));
        assert_eq!(table.cost("local", "anything-else", 1_000_000, 0).unwrap(), dec!(0));
        assert_eq!(table.providers(), vec!["local".to_string()]);
    }

    #[test]
    fn test_env_override() {
        // set_var is unsafe in edition 2024; this test owns these variables
        unsafe {
            std::env::set_var("GATEWAY_PRICING_OPENAI_INPUT", "1.25");
            std::env::set_var("GATEWAY_PRICING_OPENAI_OUTPUT", "5.00");
        }

        let table = PricingTableBuilder::new().from_env().build().unwrap();
        let entry = table.entry("openai", "unlisted-model").unwrap();
        assert_eq!(entry.input_per_mtok, dec!(1.25));
        assert_eq!(entry.output_per_mtok, dec!(5.00));

        // listed models keep their explicit rates
        let listed = table.entry("openai", "gpt-4o-mini").unwrap();
        assert_eq!(listed.input_per_mtok, dec!(0.15));

        unsafe {
            std::env::remove_var("GATEWAY_PRICING_OPENAI_INPUT");
            std::env::remove_var("GATEWAY_PRICING_OPENAI_OUTPUT");
        }
    }
}
