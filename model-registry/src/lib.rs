pub mod cost;
pub mod definition;
pub mod error;
pub mod features;
pub mod handle;
mod loader;
pub mod provider;
pub mod registry;
pub mod version;

pub use cost::{CostBreakdown, TokenCostCalculator, TokenUsage};
pub use definition::{ModelDefinition, ONE_MILLION_TOKENS, Pricing};
pub use error::{RegistryError, Result, ValidationError};
pub use features::{Feature, InstructionRole, SupportedFeatures};
pub use handle::RegistryHandle;
pub use provider::{Provider, UnknownProvider};
pub use registry::{BUILTIN_MODELS_YAML, ModelRegistry};
pub use version::{ReleaseDate, parse_release_date};
