//! Integration tests for Configuration System

use crate::integration::test_utils::with_xdg_env;
use memoflow::config::{ConfigLoader, ProviderType, ValidationError};
use memoflow::error::{ApiError, WorkflowError};
use memoflow::model::ProviderModelCall;
use memoflow::workflow::{NormalizerMode, Orchestrator};
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

const LOCAL_PROVIDERS: &str = r#"
[models]
reasoning = "local"
writing = "local"

[providers.local]
provider_type = "local"
model = "llama3"
endpoint = "http://localhost:11434/v1"
"#;

#[test]
fn test_global_config_is_read_from_xdg_config_home() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    write(
        &temp_dir.path().join("config/memoflow/config.toml"),
        LOCAL_PROVIDERS,
    );

    let config = with_xdg_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.models.reasoning, "local");
    assert_eq!(config.providers["local"].provider_type, ProviderType::LocalCustom);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write(
        &workspace.join("config/config.toml"),
        "[workflow]\ntimeout_secs = 120\nnormalizer = \"model\"\n",
    );

    let config = with_xdg_env(
        &temp_dir,
        &[
            ("MEMOFLOW__WORKFLOW__TIMEOUT_SECS", "45"),
            ("MEMOFLOW__WORKFLOW__NORMALIZER", "deterministic"),
        ],
        || ConfigLoader::load(&workspace).unwrap(),
    );

    assert_eq!(config.workflow.timeout_secs, 45);
    assert_eq!(config.workflow.normalizer, NormalizerMode::Deterministic);
}

#[test]
fn test_environment_specific_workspace_file() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write(&workspace.join("config/config.toml"), "[logging]\nlevel = \"info\"\n");
    write(&workspace.join("config/staging.toml"), "[logging]\nlevel = \"warn\"\n");

    let config = with_xdg_env(&temp_dir, &[("MEMOFLOW_ENV", "staging")], || {
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_validation_reports_unknown_roles_and_bad_profiles() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("memoflow.toml");
    write(
        &config_file,
        r#"
[models]
reasoning = "ghost"

[providers.writing]
provider_type = "local"
model = "llama3"

[workflow]
timeout_secs = 0
"#,
    );

    let config = with_xdg_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    let errors = config.validate().unwrap_err();

    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::Provider(name, _) if name == "writing")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::Models(msg) if msg.contains("ghost"))));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Workflow(_))));
}

#[test]
fn test_orchestrator_from_config_reads_format_guide() {
    let temp_dir = TempDir::new().unwrap();
    let guide = temp_dir.path().join("guide.md");
    write(&guide, "Every note is a checklist.");
    let config_file = temp_dir.path().join("memoflow.toml");
    write(
        &config_file,
        &format!(
            "{}\n[workflow]\nformat_guide = \"{}\"\n",
            LOCAL_PROVIDERS,
            guide.display()
        ),
    );

    let config = with_xdg_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    assert!(config.validate().is_ok());
    assert!(ProviderModelCall::from_config(&config).is_ok());
    assert!(Orchestrator::from_config(&config).is_ok());

    std::fs::remove_file(&guide).unwrap();
    match Orchestrator::from_config(&config) {
        Err(WorkflowError::Config(ApiError::ConfigError(message))) => {
            assert!(message.contains("Failed to read format guide"));
        }
        Err(other) => panic!("Expected a configuration error, got {}", other),
        Ok(_) => panic!("Expected a missing format guide to fail"),
    }
}
