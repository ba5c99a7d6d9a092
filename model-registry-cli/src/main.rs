use anyhow::Context;
use clap::Parser;
use model_registry_cli::RegistryCliArgs;
use model_registry_cli::merge_with_env;

fn main() {
    let mut args = RegistryCliArgs::parse();
    merge_with_env(&mut args, |key| std::env::var(key).ok());

    let level = if args.verbose { "debug" } else { "warn" };
    if let Err(err) = init_logging(level) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }

    match model_registry_cli::run(&args) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
