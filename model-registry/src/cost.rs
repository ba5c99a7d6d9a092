use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::definition::ONE_MILLION_TOKENS;
use crate::definition::Pricing;
use crate::error::Result;
use crate::registry::ModelRegistry;

/// Token usage counts for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// All prompt tokens, cached ones included.
    pub prompt_tokens: u64,
    /// Portion of `prompt_tokens` served from the provider's prompt cache.
    pub cached_prompt_tokens: u64,
    pub output_tokens: u64,
}

/// Cost breakdown for a single request, in USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Cost for non-cached prompt tokens.
    pub prompt_cost: f64,
    /// Cost for cached prompt tokens at the cached rate.
    pub cached_prompt_cost: f64,
    pub output_cost: f64,
    /// Savings from cached prompt tokens (vs full-price prompt).
    pub cache_savings: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Apply `pricing` to `usage`.
    ///
    /// Cached tokens are capped at `prompt_tokens`. `cache_savings` is
    /// negative when the cached rate is above the prompt rate.
    pub fn from_pricing(pricing: &Pricing, usage: &TokenUsage) -> Self {
        let per_token = |tokens: u64, rate: f64| (tokens as f64) * rate / ONE_MILLION_TOKENS;

        let cached = usage.cached_prompt_tokens.min(usage.prompt_tokens);
        let prompt_cost = per_token(usage.prompt_tokens - cached, pricing.prompt_tokens);
        let cached_prompt_cost = per_token(cached, pricing.cached_prompt_tokens);
        let output_cost = per_token(usage.output_tokens, pricing.output_tokens);

        // What the cached tokens would have cost at full price minus what
        // they actually cost at the cached rate.
        let cache_savings = per_token(cached, pricing.prompt_tokens) - cached_prompt_cost;

        Self {
            prompt_cost,
            cached_prompt_cost,
            output_cost,
            cache_savings,
            total_cost: prompt_cost + cached_prompt_cost + output_cost,
        }
    }
}

/// Calculates token costs from a registry's pricing.
#[derive(Debug, Clone)]
pub struct TokenCostCalculator {
    registry: Arc<ModelRegistry>,
}

impl TokenCostCalculator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Cost of `usage` on `model`, which may be an alias or a concrete
    /// model name.
    pub fn calculate(&self, model: &str, usage: &TokenUsage) -> Result<CostBreakdown> {
        let definition = self.registry.lookup(model)?;
        Ok(CostBreakdown::from_pricing(&definition.pricing, usage))
    }

    /// Format a cost value as a USD string, e.g. `"$0.0042"` or `"-$1.50"`.
    pub fn format_cost(cost: f64) -> String {
        let sign = if cost < 0.0 { "-" } else { "" };
        let amount = cost.abs();
        if amount < 0.01 {
            format!("{sign}${amount:.4}")
        } else {
            format!("{sign}${amount:.2}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn calculator() -> TokenCostCalculator {
        TokenCostCalculator::new(Arc::new(ModelRegistry::builtin().unwrap()))
    }

    #[test]
    fn calculate_cost_for_known_model() {
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            cached_prompt_tokens: 0,
            output_tokens: 1_000_000,
        };

        let b = calculator().calculate("gpt-4o", &usage).unwrap();
        // $2.50 per Mtok prompt, $10 per Mtok output
        assert!((b.prompt_cost - 2.5).abs() < 0.001);
        assert!((b.output_cost - 10.0).abs() < 0.001);
        assert!((b.total_cost - 12.5).abs() < 0.001);
        assert!(b.cache_savings.abs() < 0.001);
    }

    #[test]
    fn calculate_cost_with_cache() {
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            cached_prompt_tokens: 500_000,
            output_tokens: 0,
        };

        let b = calculator().calculate("o1", &usage).unwrap();
        // 500k non-cached at $15/Mtok = $7.50
        // 500k cached at $7.50/Mtok = $3.75
        assert!((b.prompt_cost - 7.5).abs() < 0.001);
        assert!((b.cached_prompt_cost - 3.75).abs() < 0.001);
        assert!((b.total_cost - 11.25).abs() < 0.001);
        // Savings: 500k * ($15 - $7.50) / 1M = $3.75
        assert!((b.cache_savings - 3.75).abs() < 0.001);
    }

    #[test]
    fn concrete_model_name_uses_alias_pricing() {
        let usage = TokenUsage {
            prompt_tokens: 2_000_000,
            cached_prompt_tokens: 0,
            output_tokens: 0,
        };
        let calc = calculator();
        assert_eq!(
            calc.calculate("o1-mini-12-17-24", &usage).unwrap(),
            calc.calculate("o1-mini", &usage).unwrap()
        );
    }

    #[test]
    fn unpriced_model_costs_nothing() {
        let usage = TokenUsage {
            prompt_tokens: 10_000,
            cached_prompt_tokens: 0,
            output_tokens: 10_000,
        };
        let b = calculator().calculate("claude-3-opus", &usage).unwrap();
        assert_eq!(b, CostBreakdown::default());
    }

    #[test]
    fn cached_tokens_are_capped_at_prompt_tokens() {
        let pricing = Pricing::new(2.0, 1.0, 0.0);
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            cached_prompt_tokens: 3_000_000,
            output_tokens: 0,
        };
        let b = CostBreakdown::from_pricing(&pricing, &usage);
        assert_eq!(b.prompt_cost, 0.0);
        assert!((b.cached_prompt_cost - 1.0).abs() < 0.001);
        assert!((b.cache_savings - 1.0).abs() < 0.001);
        assert!((b.total_cost - 1.0).abs() < 0.001);
    }

    #[test]
    fn cached_rate_above_prompt_rate_gives_negative_savings() {
        let pricing = Pricing::new(1.0, 3.0, 0.0);
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            cached_prompt_tokens: 1_000_000,
            output_tokens: 0,
        };
        let b = CostBreakdown::from_pricing(&pricing, &usage);
        assert!((b.cache_savings + 2.0).abs() < 0.001);
        assert!((b.total_cost - 3.0).abs() < 0.001);
    }

    #[test]
    fn calculate_unknown_model_is_not_found() {
        let err = calculator()
            .calculate("nonexistent-model", &TokenUsage::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn format_cost_display() {
        assert_eq!(TokenCostCalculator::format_cost(0.0042), "$0.0042");
        assert_eq!(TokenCostCalculator::format_cost(1.50), "$1.50");
        assert_eq!(TokenCostCalculator::format_cost(0.0), "$0.0000");
        assert_eq!(TokenCostCalculator::format_cost(-0.005), "-$0.0050");
        assert_eq!(TokenCostCalculator::format_cost(-2.0), "-$2.00");
    }
}
