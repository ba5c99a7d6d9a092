//! YAML input layer.
//!
//! Parsing is split in two so that the error kinds stay distinct: serde only
//! checks that the document is well-formed and has the right shape, with
//! every field optional, and [`RawModelEntry::into_definition`] turns missing
//! or unknown values into [`ValidationError`]s.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

use crate::definition::ModelDefinition;
use crate::definition::Pricing;
use crate::error::RegistryError;
use crate::error::Result;
use crate::error::ValidationError;
use crate::features::Feature;
use crate::features::SupportedFeatures;
use crate::provider::Provider;

/// A model entry as written in the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawModelEntry {
    provider: Option<String>,
    alias: Option<String>,
    model_names: Option<Vec<String>>,
    supported_features: Option<BTreeMap<String, Option<bool>>>,
    pricing: Option<RawPricing>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPricing {
    prompt_tokens: Option<f64>,
    cached_prompt_tokens: Option<f64>,
    output_tokens: Option<f64>,
}

/// Parses a document that is either a bare sequence of entries or a mapping
/// with a `models` key holding that sequence.
pub(crate) fn parse_entries(source: &str) -> Result<Vec<RawModelEntry>> {
    let document: Value = serde_yaml::from_str(source)?;
    let entries = match document {
        Value::Sequence(entries) => Value::Sequence(entries),
        Value::Mapping(mut mapping) => mapping.remove("models").ok_or_else(|| {
            RegistryError::Parse("expected a top-level `models` key".to_string())
        })?,
        Value::Null => {
            return Err(RegistryError::Parse("document is empty".to_string()));
        }
        _ => {
            return Err(RegistryError::Parse(
                "expected a sequence of model entries".to_string(),
            ));
        }
    };
    Ok(serde_yaml::from_value(entries)?)
}

impl RawModelEntry {
    /// `entry` is the 1-based position of this entry in the document.
    pub(crate) fn into_definition(
        self,
        entry: usize,
    ) -> std::result::Result<ModelDefinition, ValidationError> {
        let missing = |field: &str| ValidationError::MissingField {
            entry,
            field: field.to_string(),
        };

        let alias = self.alias.ok_or_else(|| missing("alias"))?;
        let provider = self.provider.ok_or_else(|| missing("provider"))?;
        let provider = provider
            .parse::<Provider>()
            .map_err(|err| ValidationError::UnknownProvider {
                alias: alias.clone(),
                provider: err.0,
            })?;
        let model_names = self.model_names.ok_or_else(|| missing("model_names"))?;
        let flags = self
            .supported_features
            .ok_or_else(|| missing("supported_features"))?;
        let pricing = self.pricing.ok_or_else(|| missing("pricing"))?;

        let supported_features = features_from_flags(&alias, entry, flags)?;
        let pricing = Pricing::new(
            pricing
                .prompt_tokens
                .ok_or_else(|| missing("pricing.prompt_tokens"))?,
            pricing
                .cached_prompt_tokens
                .ok_or_else(|| missing("pricing.cached_prompt_tokens"))?,
            pricing
                .output_tokens
                .ok_or_else(|| missing("pricing.output_tokens"))?,
        );

        Ok(ModelDefinition {
            provider,
            alias,
            model_names,
            supported_features,
            pricing,
        })
    }
}

fn features_from_flags(
    alias: &str,
    entry: usize,
    flags: BTreeMap<String, Option<bool>>,
) -> std::result::Result<SupportedFeatures, ValidationError> {
    let missing = |feature: Feature| ValidationError::MissingField {
        entry,
        field: format!("supported_features.{feature}"),
    };
    let mut features = SupportedFeatures::default();
    let mut seen = Vec::with_capacity(Feature::ALL.len());
    for (name, enabled) in flags {
        let feature = name
            .parse::<Feature>()
            .map_err(|_| ValidationError::UnknownFeature {
                alias: alias.to_string(),
                feature: name.clone(),
            })?;
        features.set(feature, enabled.ok_or_else(|| missing(feature))?);
        seen.push(feature);
    }

    if let Some(absent) = Feature::ALL.into_iter().find(|f| !seen.contains(f)) {
        return Err(missing(absent));
    }
    Ok(features)
}
