//! Integration tests for provider clients behind the model-call capability

use memoflow::config::{MemoflowConfig, ProviderConfig, ProviderType};
use memoflow::model::{ModelCall, ProviderModelCall, StructuredRequest, TextRequest};
use memoflow::provider::{CompletionOptions, ModelProvider, ProviderFactory, ProviderRegistry};
use memoflow::workflow::PLAN_SCHEMA;
use std::sync::Arc;

fn local(model: &str, endpoint: &str) -> ProviderConfig {
    ProviderConfig {
        provider_name: None,
        provider_type: ProviderType::LocalCustom,
        model: model.to_string(),
        api_key: None,
        endpoint: Some(endpoint.to_string()),
        default_options: CompletionOptions {
            temperature: Some(0.2),
            ..CompletionOptions::default()
        },
    }
}

/// Both roles point at a port nothing listens on.
fn unreachable_config() -> MemoflowConfig {
    let mut config = MemoflowConfig::default();
    config
        .providers
        .insert("reasoning".to_string(), local("planner", "http://127.0.0.1:9/v1"));
    config
        .providers
        .insert("writing".to_string(), local("writer", "http://127.0.0.1:9/v1"));
    config
}

#[test]
fn test_factory_builds_each_provider_kind() {
    let openai = ProviderFactory::create_client(&ModelProvider::OpenAI {
        model: "gpt-4o".to_string(),
        api_key: "test-key".to_string(),
        base_url: None,
    })
    .unwrap();
    assert_eq!(openai.provider_name(), "openai");
    assert_eq!(openai.model_name(), "gpt-4o");

    let anthropic = ProviderFactory::create_client(&ModelProvider::Anthropic {
        model: "claude-3-5-sonnet".to_string(),
        api_key: "test-key".to_string(),
    })
    .unwrap();
    assert_eq!(anthropic.provider_name(), "anthropic");

    let custom = ProviderFactory::create_client(&ModelProvider::LocalCustom {
        model: "llama3".to_string(),
        endpoint: "http://localhost:11434/v1".to_string(),
        api_key: None,
    })
    .unwrap();
    assert_eq!(custom.provider_name(), "local");
    assert_eq!(custom.model_name(), "llama3");
}

#[test]
fn test_registry_resolves_configured_roles() {
    let config = unreachable_config();
    let registry = ProviderRegistry::from_config(&config);

    let reasoning = registry.create_client(&config.models.reasoning).unwrap();
    assert_eq!(reasoning.model_name(), "planner");
    assert_eq!(
        registry.get("writing").and_then(|p| p.provider_name.as_deref()),
        Some("writing")
    );
    assert!(registry.create_client("missing").is_err());
}

#[test]
fn test_model_call_requires_both_roles() {
    let mut config = unreachable_config();
    config.models.writing = "nowhere".to_string();
    assert!(ProviderModelCall::from_config(&config).is_err());
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let call = ProviderModelCall::from_config(&unreachable_config()).unwrap();

    let err = call
        .structured(StructuredRequest {
            system: Arc::from("system"),
            prompt: "plan".to_string(),
            schema: &PLAN_SCHEMA,
        })
        .await
        .unwrap_err();
    assert!(err.is_unreachable(), "expected unreachable, got {:?}", err);

    let err = call
        .text(TextRequest {
            system: Arc::from("system"),
            prompt: "write".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unreachable());
}
