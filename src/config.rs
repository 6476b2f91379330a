//! Configuration System
//!
//! Layered configuration for providers, model roles, workflow behavior, and logging.
//! Sources merge in order: built-in defaults, the user config file, workspace config
//! files, then `MEMOFLOW__*` environment variables.

use crate::logging::LoggingConfig;
use crate::workflow::NormalizerMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoflowConfig {
    /// Model provider configurations, keyed by name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Which provider serves which role
    #[serde(default)]
    pub models: ModelRoles,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider names for the two model roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoles {
    /// Serves structured calls: planning and quality evaluation
    #[serde(default = "default_reasoning_role")]
    pub reasoning: String,

    /// Serves free-text calls: generation, revision, normalization
    #[serde(default = "default_writing_role")]
    pub writing: String,
}

fn default_reasoning_role() -> String {
    "reasoning".to_string()
}

fn default_writing_role() -> String {
    "writing".to_string()
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            reasoning: default_reasoning_role(),
            writing: default_writing_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Wall-clock budget for one workflow run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How the final normalization pass is performed
    #[serde(default)]
    pub normalizer: NormalizerMode,

    /// Document-format guide included in every system prompt
    #[serde(default)]
    pub format_guide: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    800
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            normalizer: NormalizerMode::default(),
            format_guide: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String, String),
    Models(String),
    Workflow(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ValidationError::Models(msg) => write!(f, "Models: {}", msg),
            ValidationError::Workflow(msg) => write!(f, "Workflow: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MemoflowConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();
        for name in names {
            if let Err(e) = self.providers[name].validate() {
                errors.push(ValidationError::Provider(name.clone(), e));
            }
        }

        for (role, provider_name) in [
            ("reasoning", &self.models.reasoning),
            ("writing", &self.models.writing),
        ] {
            if !self.providers.contains_key(provider_name) {
                errors.push(ValidationError::Models(format!(
                    "{} role refers to unknown provider '{}'",
                    role, provider_name
                )));
            }
        }

        if self.workflow.timeout_secs == 0 {
            errors.push(ValidationError::Workflow(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(guide) = &self.workflow.format_guide {
            if !guide.is_file() {
                errors.push(ValidationError::Workflow(format!(
                    "format_guide {} does not exist",
                    guide.display()
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.workflow.timeout_secs)
    }
}
