use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use model_registry::Feature;
use model_registry::Provider;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "MODEL_REGISTRY_CONFIG";

/// Validate and query LLM model registries.
#[derive(Debug, Clone, Parser)]
#[command(name = "model-registry", version, about, long_about = None)]
pub struct RegistryCliArgs {
    /// Registry YAML file. Defaults to the built-in catalog.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RegistryCommand {
    /// Load the registry and report what it contains.
    Validate,

    /// List aliases, optionally filtered.
    List {
        #[arg(long, value_parser = parse_provider)]
        provider: Option<Provider>,

        #[arg(long, value_parser = parse_feature)]
        feature: Option<Feature>,
    },

    /// Show the definition behind an alias or model name.
    Show {
        name: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the concrete model name an alias or model name resolves to.
    Resolve { name: String },

    /// Print whether an alias supports a feature flag.
    Supports { alias: String, feature: String },

    /// Price a request.
    Cost {
        /// Alias or concrete model name.
        name: String,

        #[arg(long)]
        prompt: u64,

        /// Cached prompt tokens, counted within --prompt.
        #[arg(long, default_value_t = 0)]
        cached: u64,

        #[arg(long, default_value_t = 0)]
        output: u64,
    },
}

/// Where the registry is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    Builtin,
    File(PathBuf),
}

impl RegistryCliArgs {
    pub fn source(&self) -> RegistrySource {
        match &self.config {
            Some(path) => RegistrySource::File(path.clone()),
            None => RegistrySource::Builtin,
        }
    }
}

/// Fill unset options from the environment. `lookup` is usually
/// `|key| std::env::var(key).ok()`.
pub fn merge_with_env(args: &mut RegistryCliArgs, lookup: impl Fn(&str) -> Option<String>) {
    if args.config.is_none()
        && let Some(val) = lookup(CONFIG_ENV_VAR)
        && !val.trim().is_empty()
    {
        args.config = Some(PathBuf::from(val));
    }
}

fn parse_provider(value: &str) -> Result<Provider, String> {
    value.parse::<Provider>().map_err(|err| {
        let known: Vec<&str> = Provider::ALL.into_iter().map(Provider::as_str).collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}

fn parse_feature(value: &str) -> Result<Feature, String> {
    value.parse::<Feature>().map_err(|err| {
        let known: Vec<&str> = Feature::ALL.into_iter().map(Feature::as_str).collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}
