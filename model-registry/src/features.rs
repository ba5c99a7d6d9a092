use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RegistryError;

/// Capability flags every model definition must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Accepts a reasoning-effort parameter.
    ReasoningEffort,
    /// Accepts `developer` role messages.
    DeveloperMessage,
    /// Accepts `system` role messages.
    SystemMessage,
    /// Can be constrained to a response schema.
    StructuredOutput,
    /// Accepts image inputs.
    ImageIngestion,
    /// Supports tool / function calling.
    FunctionCall,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::ReasoningEffort,
        Feature::DeveloperMessage,
        Feature::SystemMessage,
        Feature::StructuredOutput,
        Feature::ImageIngestion,
        Feature::FunctionCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::ReasoningEffort => "reasoning_effort",
            Feature::DeveloperMessage => "developer_message",
            Feature::SystemMessage => "system_message",
            Feature::StructuredOutput => "structured_output",
            Feature::ImageIngestion => "image_ingestion",
            Feature::FunctionCall => "function_call",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| RegistryError::InvalidFeature(s.to_string()))
    }
}

/// The full capability record for one model family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupportedFeatures {
    pub reasoning_effort: bool,
    pub developer_message: bool,
    pub system_message: bool,
    pub structured_output: bool,
    pub image_ingestion: bool,
    pub function_call: bool,
}

impl SupportedFeatures {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::ReasoningEffort => self.reasoning_effort,
            Feature::DeveloperMessage => self.developer_message,
            Feature::SystemMessage => self.system_message,
            Feature::StructuredOutput => self.structured_output,
            Feature::ImageIngestion => self.image_ingestion,
            Feature::FunctionCall => self.function_call,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::ReasoningEffort => &mut self.reasoning_effort,
            Feature::DeveloperMessage => &mut self.developer_message,
            Feature::SystemMessage => &mut self.system_message,
            Feature::StructuredOutput => &mut self.structured_output,
            Feature::ImageIngestion => &mut self.image_ingestion,
            Feature::FunctionCall => &mut self.function_call,
        };
        *slot = enabled;
    }

    /// Every flag paired with its value, in [`Feature::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL
            .into_iter()
            .map(move |feature| (feature, self.get(feature)))
    }

    /// Flags that are switched on.
    pub fn enabled(&self) -> Vec<Feature> {
        self.iter()
            .filter_map(|(feature, on)| on.then_some(feature))
            .collect()
    }

    /// Role a caller should use for instruction messages.
    pub fn instruction_role(&self) -> InstructionRole {
        if self.developer_message {
            InstructionRole::Developer
        } else if self.system_message {
            InstructionRole::System
        } else {
            InstructionRole::User
        }
    }
}

/// Message role that carries instructions for a model.
///
/// `User` means the model accepts neither developer nor system messages, so
/// instructions have to be folded into user turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionRole {
    Developer,
    System,
    User,
}

impl InstructionRole {
    pub fn as_str(self) -> &'static str {
        match self {
            InstructionRole::Developer => "developer",
            InstructionRole::System => "system",
            InstructionRole::User => "user",
        }
    }
}

impl fmt::Display for InstructionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
