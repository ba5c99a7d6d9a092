use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;
use tracing::warn;

use crate::definition::ModelDefinition;
use crate::definition::Pricing;
use crate::error::RegistryError;
use crate::error::Result;
use crate::error::ValidationError;
use crate::features::Feature;
use crate::features::InstructionRole;
use crate::features::SupportedFeatures;
use crate::loader;
use crate::provider::Provider;

/// Catalog shipped with the crate, see `models.yaml`.
pub const BUILTIN_MODELS_YAML: &str = include_str!("../models.yaml");

/// Validated, immutable set of model definitions.
///
/// Definitions are keyed by alias in load order, with a secondary index from
/// every concrete model name to its owning alias. Both are built once by
/// [`ModelRegistry::from_definitions`] and never change afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    definitions: IndexMap<String, ModelDefinition>,
    model_names: HashMap<String, String>,
}

impl ModelRegistry {
    /// Parse and validate a YAML document.
    pub fn load(source: &str) -> Result<Self> {
        let entries = loader::parse_entries(source)?;
        let definitions = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_definition(index + 1))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::from_definitions(definitions)
    }

    /// Read `path` and [`load`](Self::load) its contents.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading model registry");
        Self::load(&source)
    }

    /// The catalog embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::load(BUILTIN_MODELS_YAML)
    }

    /// Validate already-typed definitions and index them.
    pub fn from_definitions(definitions: Vec<ModelDefinition>) -> Result<Self> {
        let mut by_alias: IndexMap<String, ModelDefinition> =
            IndexMap::with_capacity(definitions.len());
        let mut model_names: HashMap<String, String> = HashMap::new();

        for (index, definition) in definitions.into_iter().enumerate() {
            validate_definition(index + 1, &definition)?;

            if by_alias.contains_key(&definition.alias) {
                return Err(ValidationError::DuplicateAlias {
                    alias: definition.alias,
                }
                .into());
            }

            check_model_names(&model_names, &definition)?;
            for name in &definition.model_names {
                model_names.insert(name.clone(), definition.alias.clone());
            }

            by_alias.insert(definition.alias.clone(), definition);
        }

        for alias in by_alias.keys() {
            if let Some(owner) = model_names.get(alias)
                && owner != alias
            {
                return Err(ValidationError::AliasShadowsModelName {
                    alias: alias.clone(),
                    owner: owner.clone(),
                }
                .into());
            }
        }

        let registry = Self {
            definitions: by_alias,
            model_names,
        };
        registry.report_load();
        Ok(registry)
    }

    fn report_load(&self) {
        if self.is_empty() {
            warn!("model registry loaded with no definitions");
            return;
        }
        for alias in self.unpriced_aliases() {
            warn!(alias, "model pricing is zero; cost accounting will report $0 for it");
        }
        debug!(
            aliases = self.definitions.len(),
            model_names = self.model_names.len(),
            "model registry loaded"
        );
    }

    /// The definition registered under `alias`.
    pub fn get(&self, alias: &str) -> Result<&ModelDefinition> {
        self.definitions
            .get(alias)
            .ok_or_else(|| RegistryError::NotFound(alias.to_string()))
    }

    /// The definition that lists `model_name` among its concrete names.
    pub fn resolve_alias(&self, model_name: &str) -> Result<&ModelDefinition> {
        self.model_names
            .get(model_name)
            .and_then(|alias| self.definitions.get(alias))
            .ok_or_else(|| RegistryError::NotFound(model_name.to_string()))
    }

    /// Accepts either an alias or a concrete model name.
    pub fn lookup(&self, name: &str) -> Result<&ModelDefinition> {
        match self.definitions.get(name) {
            Some(definition) => Ok(definition),
            None => self.resolve_alias(name),
        }
    }

    pub fn get_features(&self, alias: &str) -> Result<SupportedFeatures> {
        Ok(self.get(alias)?.supported_features)
    }

    pub fn get_pricing(&self, alias: &str) -> Result<Pricing> {
        Ok(self.get(alias)?.pricing)
    }

    /// Whether `alias` has the flag named `feature_name`.
    ///
    /// An unknown alias is reported before an unknown feature name.
    pub fn supports(&self, alias: &str, feature_name: &str) -> Result<bool> {
        let features = self.get_features(alias)?;
        let feature = feature_name.parse::<Feature>()?;
        Ok(features.get(feature))
    }

    /// Concrete model name to send to the provider.
    ///
    /// An alias resolves to its most recent model name; a concrete model name
    /// is returned unchanged.
    pub fn resolve_model_name<'a>(&'a self, name: &'a str) -> Result<&'a str> {
        if let Some(definition) = self.definitions.get(name) {
            return definition
                .most_recent_model()
                .ok_or_else(|| RegistryError::NotFound(name.to_string()));
        }
        self.resolve_alias(name).map(|_| name)
    }

    pub fn provider_of(&self, name: &str) -> Result<Provider> {
        Ok(self.lookup(name)?.provider)
    }

    pub fn instruction_role(&self, name: &str) -> Result<InstructionRole> {
        Ok(self.lookup(name)?.supported_features.instruction_role())
    }

    pub fn models_supporting(&self, feature: Feature) -> Vec<&ModelDefinition> {
        self.definitions
            .values()
            .filter(|definition| definition.supported_features.get(feature))
            .collect()
    }

    pub fn by_provider(&self, provider: Provider) -> Vec<&ModelDefinition> {
        self.definitions
            .values()
            .filter(|definition| definition.provider == provider)
            .collect()
    }

    /// Aliases whose rates are all zero.
    pub fn unpriced_aliases(&self) -> Vec<&str> {
        self.definitions
            .values()
            .filter(|definition| definition.pricing.is_unpriced())
            .map(|definition| definition.alias.as_str())
            .collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.definitions.values()
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of concrete model names across all aliases.
    pub fn model_name_count(&self) -> usize {
        self.model_names.len()
    }
}

fn validate_definition(entry: usize, definition: &ModelDefinition) -> Result<()> {
    if definition.alias.trim().is_empty() {
        return Err(ValidationError::BlankField {
            entry,
            field: "alias".to_string(),
        }
        .into());
    }
    if definition.model_names.is_empty() {
        return Err(ValidationError::EmptyModelNames {
            alias: definition.alias.clone(),
        }
        .into());
    }
    if definition
        .model_names
        .iter()
        .any(|name| name.trim().is_empty())
    {
        return Err(ValidationError::BlankField {
            entry,
            field: "model_names".to_string(),
        }
        .into());
    }
    for (field, value) in definition.pricing.rates() {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidPrice {
                alias: definition.alias.clone(),
                field,
                value,
            }
            .into());
        }
    }
    Ok(())
}

/// Each of `definition`'s model names must be new to the registry and
/// listed only once in the definition itself.
fn check_model_names(
    claimed: &HashMap<String, String>,
    definition: &ModelDefinition,
) -> Result<()> {
    let mut own = HashSet::with_capacity(definition.model_names.len());
    for name in &definition.model_names {
        let first = match claimed.get(name) {
            Some(first) => first,
            None if !own.insert(name.as_str()) => &definition.alias,
            None => continue,
        };
        return Err(ValidationError::DuplicateModelName {
            model_name: name.clone(),
            first: first.clone(),
            second: definition.alias.clone(),
        }
        .into());
    }
    Ok(())
}
