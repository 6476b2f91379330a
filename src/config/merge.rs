//! Merge rules: built-in defaults applied beneath every other source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the built-in defaults applied.
///
/// The default `reasoning` and `writing` providers point at OpenAI and take
/// their key from `OPENAI_API_KEY`.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("models.reasoning", "reasoning")?
        .set_default("models.writing", "writing")?
        .set_default("providers.reasoning.provider_type", "openai")?
        .set_default("providers.reasoning.model", "o3-mini")?
        .set_default("providers.writing.provider_type", "openai")?
        .set_default("providers.writing.model", "gpt-4o")?
        .set_default("workflow.timeout_secs", 800)?
        .set_default("workflow.normalizer", "model")
}
