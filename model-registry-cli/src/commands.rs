use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use model_registry::Feature;
use model_registry::InstructionRole;
use model_registry::ModelDefinition;
use model_registry::ModelRegistry;
use model_registry::TokenCostCalculator;
use model_registry::TokenUsage;
use serde::Serialize;
use tracing::debug;

use crate::cli_args::RegistryCliArgs;
use crate::cli_args::RegistryCommand;
use crate::cli_args::RegistrySource;

pub fn load_registry(source: &RegistrySource) -> anyhow::Result<ModelRegistry> {
    match source {
        RegistrySource::Builtin => {
            debug!("using built-in model catalog");
            ModelRegistry::builtin().context("built-in model catalog is invalid")
        }
        RegistrySource::File(path) => ModelRegistry::load_from_path(path)
            .with_context(|| format!("failed to load model registry from {}", path.display())),
    }
}

/// Execute the parsed command and return what should be printed on stdout.
pub fn run(args: &RegistryCliArgs) -> anyhow::Result<String> {
    let registry = Arc::new(load_registry(&args.source())?);
    execute(&registry, &args.command)
}

pub fn execute(
    registry: &Arc<ModelRegistry>,
    command: &RegistryCommand,
) -> anyhow::Result<String> {
    let mut out = String::new();
    match command {
        RegistryCommand::Validate => {
            writeln!(
                out,
                "ok: {} aliases, {} model names",
                registry.len(),
                registry.model_name_count()
            )?;
            let unpriced = registry.unpriced_aliases();
            if !unpriced.is_empty() {
                writeln!(out, "zero-priced: {}", unpriced.join(", "))?;
            }
        }
        RegistryCommand::List { provider, feature } => {
            let selected = registry.iter().filter(|definition| {
                provider.is_none_or(|p| definition.provider == p)
                    && feature.is_none_or(|f| definition.supported_features.get(f))
            });
            for definition in selected {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    definition.alias,
                    definition.provider,
                    definition.model_names.join(",")
                )?;
            }
        }
        RegistryCommand::Show { name, json } => {
            let definition = registry.lookup(name)?;
            if *json {
                let view = ShowView::new(definition);
                writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            } else {
                render_definition(&mut out, definition)?;
            }
        }
        RegistryCommand::Resolve { name } => {
            writeln!(out, "{}", registry.resolve_model_name(name)?)?;
        }
        RegistryCommand::Supports { alias, feature } => {
            writeln!(out, "{}", registry.supports(alias, feature)?)?;
        }
        RegistryCommand::Cost {
            name,
            prompt,
            cached,
            output,
        } => {
            if cached > prompt {
                anyhow::bail!("--cached ({cached}) cannot exceed --prompt ({prompt})");
            }
            let usage = TokenUsage {
                prompt_tokens: *prompt,
                cached_prompt_tokens: *cached,
                output_tokens: *output,
            };
            let alias = registry.lookup(name)?.alias.clone();
            let calculator = TokenCostCalculator::new(Arc::clone(registry));
            let cost = calculator.calculate(name, &usage)?;
            let fmt = TokenCostCalculator::format_cost;
            writeln!(out, "model:         {name} ({alias})")?;
            writeln!(out, "prompt:        {}", fmt(cost.prompt_cost))?;
            writeln!(out, "cached prompt: {}", fmt(cost.cached_prompt_cost))?;
            writeln!(out, "output:        {}", fmt(cost.output_cost))?;
            writeln!(out, "cache savings: {}", fmt(cost.cache_savings))?;
            writeln!(out, "total:         {}", fmt(cost.total_cost))?;
        }
    }
    Ok(out)
}

#[derive(Serialize)]
struct ShowView<'a> {
    #[serde(flatten)]
    definition: &'a ModelDefinition,
    most_recent_model: Option<&'a str>,
    instruction_role: InstructionRole,
}

impl<'a> ShowView<'a> {
    fn new(definition: &'a ModelDefinition) -> Self {
        Self {
            definition,
            most_recent_model: definition.most_recent_model(),
            instruction_role: definition.supported_features.instruction_role(),
        }
    }
}

fn render_definition(out: &mut String, definition: &ModelDefinition) -> std::fmt::Result {
    writeln!(out, "alias:             {}", definition.alias)?;
    writeln!(out, "provider:          {}", definition.provider)?;
    writeln!(out, "model_names:       {}", definition.model_names.join(", "))?;
    writeln!(
        out,
        "most_recent_model: {}",
        definition.most_recent_model().unwrap_or("-")
    )?;
    writeln!(
        out,
        "instruction_role:  {}",
        definition.supported_features.instruction_role()
    )?;
    let enabled: Vec<&str> = definition
        .supported_features
        .enabled()
        .into_iter()
        .map(Feature::as_str)
        .collect();
    writeln!(out, "enabled:           {}", enabled.join(", "))?;
    writeln!(out, "features:")?;
    for (feature, enabled) in definition.supported_features.iter() {
        writeln!(out, "  {:<20} {enabled}", feature.as_str())?;
    }
    let pricing = &definition.pricing;
    writeln!(out, "pricing (USD per 1M tokens):")?;
    writeln!(out, "  prompt_tokens        {}", pricing.prompt_tokens)?;
    writeln!(out, "  cached_prompt_tokens {}", pricing.cached_prompt_tokens)?;
    writeln!(out, "  output_tokens        {}", pricing.output_tokens)?;
    if pricing.is_unpriced() {
        writeln!(out, "  (pricing not published)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_registry::Provider;
    use model_registry::RegistryError;
    use pretty_assertions::assert_eq;

    fn run_builtin(command: RegistryCommand) -> anyhow::Result<String> {
        let registry = Arc::new(ModelRegistry::builtin().unwrap());
        execute(&registry, &command)
    }

    #[test]
    fn validate_reports_counts_and_zero_pricing() {
        let out = run_builtin(RegistryCommand::Validate).unwrap();
        assert_eq!(
            out,
            "ok: 7 aliases, 13 model names\n\
             zero-priced: o3-mini, claude-3-5-sonnet, claude-3-haiku, claude-3-opus\n"
        );
    }

    #[test]
    fn list_filters_by_provider_and_feature() {
        let out = run_builtin(RegistryCommand::List {
            provider: Some(Provider::OpenAi),
            feature: Some(Feature::DeveloperMessage),
        })
        .unwrap();
        assert_eq!(
            out,
            "o1\topenai\to1-01-15-24,o1-12-17-24,o1-01-10-24\n\
             o3-mini\topenai\to3-mini-2025-01-31\n"
        );
    }

    #[test]
    fn show_renders_text_for_model_name() {
        let out = run_builtin(RegistryCommand::Show {
            name: "gpt-4o-01-10-24".into(),
            json: false,
        })
        .unwrap();
        assert!(out.starts_with("alias:             gpt-4o\n"));
        assert!(out.contains("most_recent_model: gpt-4o-12-17-24\n"));
        assert!(out.contains(
            "enabled:           system_message, structured_output, image_ingestion, function_call\n"
        ));
        assert!(out.contains("  reasoning_effort     false\n"));
        assert!(out.contains("  cached_prompt_tokens 1.25\n"));
        assert!(!out.contains("pricing not published"));
    }

    #[test]
    fn show_json_includes_derived_fields() {
        let out = run_builtin(RegistryCommand::Show {
            name: "o1-mini".into(),
            json: true,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["alias"], "o1-mini");
        assert_eq!(value["most_recent_model"], "o1-mini-12-17-24");
        assert_eq!(value["instruction_role"], "user");
        assert_eq!(value["pricing"]["output_tokens"], 12.0);
    }

    #[test]
    fn supports_prints_boolean_or_fails() {
        let out = run_builtin(RegistryCommand::Supports {
            alias: "o1".into(),
            feature: "reasoning_effort".into(),
        })
        .unwrap();
        assert_eq!(out, "true\n");

        let err = run_builtin(RegistryCommand::Supports {
            alias: "o1".into(),
            feature: "telepathy".into(),
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::InvalidFeature(_))
        ));
    }

    #[test]
    fn cost_prints_breakdown() {
        let out = run_builtin(RegistryCommand::Cost {
            name: "gpt-4o".into(),
            prompt: 1_000_000,
            cached: 0,
            output: 1_000_000,
        })
        .unwrap();
        assert!(out.contains("model:         gpt-4o (gpt-4o)\n"));
        assert!(out.contains("total:         $12.50\n"));
    }

    #[test]
    fn cost_rejects_cached_above_prompt() {
        let err = run_builtin(RegistryCommand::Cost {
            name: "gpt-4o".into(),
            prompt: 10,
            cached: 20,
            output: 0,
        })
        .unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn load_registry_adds_path_context() {
        let source = RegistrySource::File("/nonexistent/models.yaml".into());
        let err = load_registry(&source).unwrap_err();
        assert!(
            err.to_string()
                .contains("failed to load model registry from /nonexistent/models.yaml")
        );
    }
}
