//! Config command presentation.

use crate::config::{MemoflowConfig, ValidationError};
use crate::error::ApiError;
use owo_colors::OwoColorize;

pub fn format_config_validation(config: &MemoflowConfig, errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        let mut names: Vec<&String> = config.providers.keys().collect();
        names.sort();
        let names: Vec<&str> = names.into_iter().map(String::as_str).collect();
        return format!(
            "{}\n  Providers: {}\n  Reasoning: {}\n  Writing: {}\n  Normalizer: {:?}\n  Timeout: {}s",
            "Configuration is valid".green(),
            names.join(", "),
            config.models.reasoning,
            config.models.writing,
            config.workflow.normalizer,
            config.workflow.timeout_secs
        );
    }
    let mut out = format!("{}", format!("Configuration has {} error(s):", errors.len()).red());
    for error in errors {
        out.push_str(&format!("\n  - {}", error));
    }
    out
}

/// Merged configuration as TOML with API keys redacted.
pub fn format_config_show(config: &MemoflowConfig) -> Result<String, ApiError> {
    let mut redacted = config.clone();
    for provider in redacted.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("***".to_string());
        }
    }
    toml::to_string_pretty(&redacted)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
}
