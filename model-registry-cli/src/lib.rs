pub mod cli_args;
pub mod commands;

pub use cli_args::CONFIG_ENV_VAR;
pub use cli_args::RegistryCliArgs;
pub use cli_args::RegistryCommand;
pub use cli_args::RegistrySource;
pub use cli_args::merge_with_env;
pub use commands::execute;
pub use commands::load_registry;
pub use commands::run;
