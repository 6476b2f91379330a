//! Integration tests for the memoflow binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const UNREACHABLE_CONFIG: &str = r#"
[models]
reasoning = "local"
writing = "local"

[providers.local]
provider_type = "local"
model = "llama3"
endpoint = "http://127.0.0.1:9/v1"
api_key = "sk-local-secret"

[workflow]
timeout_secs = 60
"#;

/// Run the binary with a clean environment rooted in `temp_dir`.
fn memoflow(temp_dir: &TempDir, args: &[&str]) -> Output {
    let home = temp_dir.path().join("home");
    let config_home = temp_dir.path().join("xdg-config");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();

    Command::new(env!("CARGO_BIN_EXE_memoflow"))
        .env_clear()
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", &config_home)
        .arg("--workspace")
        .arg(temp_dir.path())
        .arg("--quiet")
        .args(args)
        .output()
        .unwrap()
}

fn write_config(dir: &Path) -> String {
    let path = dir.join("memoflow.toml");
    std::fs::write(&path, UNREACHABLE_CONFIG).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_validate_succeeds_for_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = memoflow(&temp_dir, &["--config", &config, "config", "validate"]);

    assert!(output.status.success(), "stderr={}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_config_validate_fails_for_invalid_workspace_config() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("config")).unwrap();
    std::fs::write(
        temp_dir.path().join("config/config.toml"),
        "[workflow]\ntimeout_secs = 0\n",
    )
    .unwrap();

    let output = memoflow(&temp_dir, &["config", "validate"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration is invalid"), "stderr={}", stderr);
    assert!(stderr.contains("timeout_secs must be greater than zero"));
}

#[test]
fn test_config_show_redacts_api_keys() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = memoflow(&temp_dir, &["--config", &config, "config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("llama3"));
    assert!(!stdout.contains("sk-local-secret"));
}

#[test]
fn test_run_rejects_non_array_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());
    std::fs::write(
        temp_dir.path().join("transcript.json"),
        r#"{"role": "user", "content": "buy eggs"}"#,
    )
    .unwrap();

    let output = memoflow(
        &temp_dir,
        &["--config", &config, "run", "--transcript", "transcript.json"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid messages format"));
}

#[test]
fn test_run_against_unreachable_provider_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());
    std::fs::write(
        temp_dir.path().join("transcript.json"),
        r#"[{"role": "user", "content": "buy eggs"}, {"role": "agent", "content": "noted"}]"#,
    )
    .unwrap();

    let output = memoflow(
        &temp_dir,
        &[
            "--config",
            &config,
            "run",
            "--transcript",
            "transcript.json",
            "--format",
            "json",
        ],
    );

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unreachable"), "stderr={}", stderr);
    assert!(output.stdout.is_empty());
}
