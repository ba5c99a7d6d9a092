use serde::Serialize;

use crate::features::SupportedFeatures;
use crate::provider::Provider;
use crate::version;

/// Number of tokens the pricing rates are expressed against.
pub const ONE_MILLION_TOKENS: f64 = 1_000_000.0;

/// Token prices for one model family, in USD per million tokens.
///
/// A rate of zero is legal and usually means the price has not been
/// published yet; see [`Pricing::is_unpriced`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pricing {
    pub prompt_tokens: f64,
    pub cached_prompt_tokens: f64,
    pub output_tokens: f64,
}

impl Pricing {
    pub fn new(prompt_tokens: f64, cached_prompt_tokens: f64, output_tokens: f64) -> Self {
        Self {
            prompt_tokens,
            cached_prompt_tokens,
            output_tokens,
        }
    }

    /// All three rates are zero.
    pub fn is_unpriced(&self) -> bool {
        self.prompt_tokens == 0.0 && self.cached_prompt_tokens == 0.0 && self.output_tokens == 0.0
    }

    pub(crate) fn rates(&self) -> [(&'static str, f64); 3] {
        [
            ("prompt_tokens", self.prompt_tokens),
            ("cached_prompt_tokens", self.cached_prompt_tokens),
            ("output_tokens", self.output_tokens),
        ]
    }
}

/// One supported model family and the concrete versions that belong to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDefinition {
    pub provider: Provider,
    /// Stable short name, e.g. `"gpt-4o"`.
    pub alias: String,
    /// Version-stamped identifiers issued by the provider.
    pub model_names: Vec<String>,
    pub supported_features: SupportedFeatures,
    pub pricing: Pricing,
}

impl ModelDefinition {
    /// The newest concrete model name, judged by the date in its suffix.
    pub fn most_recent_model(&self) -> Option<&str> {
        version::most_recent(&self.model_names)
    }
}
