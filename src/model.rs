//! Model-call capability
//!
//! The workflow components receive an explicit [`ModelCall`] object instead of
//! reaching for a global provider. Two call shapes exist: *structured* calls return a
//! JSON value shaped by a [`Schema`] (planning, evaluation) and *text* calls return a
//! free-form document (generation, revision, normalization).

use crate::config::MemoflowConfig;
use crate::error::{ApiError, GenerationError};
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient, ProviderRegistry};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Target shape of a structured call.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    /// JSON skeleton shown to the model
    pub skeleton: &'static str,
}

#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: Arc<str>,
    pub prompt: String,
    pub schema: &'static Schema,
}

#[derive(Debug, Clone)]
pub struct TextRequest {
    pub system: Arc<str>,
    pub prompt: String,
}

#[async_trait]
pub trait ModelCall: Send + Sync {
    /// Prompt + schema -> schema-shaped JSON object
    async fn structured(&self, request: StructuredRequest) -> Result<Value, GenerationError>;

    /// Prompt -> free text
    async fn text(&self, request: TextRequest) -> Result<String, GenerationError>;
}

/// Decode a structured response into the component's typed form.
pub fn decode<T: DeserializeOwned>(schema: &Schema, value: Value) -> Result<T, GenerationError> {
    serde_json::from_value(value).map_err(|e| GenerationError::schema(schema.name, e.to_string()))
}

/// Locate the JSON object in a model reply: a ```json fence, a bare fence
/// opening on `{`, or the outermost braces.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            let candidate = rest[..end].trim();
            if !candidate.is_empty() {
                return Some(candidate);
            }
        }
    }

    if let Some(start) = text.find("```\n{") {
        let rest = &text[start + "```\n".len()..];
        if let Some(end) = rest.find("```") {
            let candidate = rest[..end].trim();
            if !candidate.is_empty() {
                return Some(candidate);
            }
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    if close > open {
        return Some(&text[open..=close]);
    }

    None
}

fn schema_instruction(schema: &Schema) -> String {
    format!(
        "Respond with a single JSON object that matches this shape exactly, \
         wrapped in a ```json code fence. Do not include any other text.\n\n{}",
        schema.skeleton
    )
}

/// [`ModelCall`] over configured provider clients.
///
/// Structured calls go to the reasoning model; text calls go to the writing model.
pub struct ProviderModelCall {
    reasoning: Arc<dyn ModelProviderClient>,
    reasoning_options: CompletionOptions,
    writing: Arc<dyn ModelProviderClient>,
    writing_options: CompletionOptions,
}

impl ProviderModelCall {
    pub fn new(
        reasoning: Arc<dyn ModelProviderClient>,
        writing: Arc<dyn ModelProviderClient>,
    ) -> Self {
        Self {
            reasoning,
            reasoning_options: CompletionOptions::default(),
            writing,
            writing_options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, reasoning: CompletionOptions, writing: CompletionOptions) -> Self {
        self.reasoning_options = reasoning;
        self.writing_options = writing;
        self
    }

    /// Resolve the `[models]` roles against the `[providers]` tables.
    pub fn from_config(config: &MemoflowConfig) -> Result<Self, ApiError> {
        let registry = ProviderRegistry::from_config(config);
        let reasoning_config = registry.get_or_error(&config.models.reasoning)?;
        let writing_config = registry.get_or_error(&config.models.writing)?;
        let reasoning_options = reasoning_config.default_options.clone();
        let writing_options = writing_config.default_options.clone();

        Ok(Self::new(
            registry.create_client(&config.models.reasoning)?,
            registry.create_client(&config.models.writing)?,
        )
        .with_options(reasoning_options, writing_options))
    }
}

#[async_trait]
impl ModelCall for ProviderModelCall {
    async fn structured(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        let messages = vec![
            ChatMessage::system(request.system.as_ref()),
            ChatMessage::user(format!(
                "{}\n\n{}",
                request.prompt,
                schema_instruction(request.schema)
            )),
        ];
        let response = self
            .reasoning
            .complete(messages, self.reasoning_options.clone())
            .await?;
        debug!(
            schema = request.schema.name,
            provider = self.reasoning.provider_name(),
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Structured completion received"
        );

        let raw = extract_json(&response.content).ok_or_else(|| {
            GenerationError::schema(request.schema.name, "no JSON object in response")
        })?;
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| GenerationError::schema(request.schema.name, e.to_string()))?;
        if !value.is_object() {
            return Err(GenerationError::schema(
                request.schema.name,
                "response is not a JSON object",
            ));
        }
        Ok(value)
    }

    async fn text(&self, request: TextRequest) -> Result<String, GenerationError> {
        let messages = vec![
            ChatMessage::system(request.system.as_ref()),
            ChatMessage::user(request.prompt),
        ];
        let response = self
            .writing
            .complete(messages, self.writing_options.clone())
            .await?;
        debug!(
            provider = self.writing.provider_name(),
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Text completion received"
        );

        let content = response.content.trim();
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}
