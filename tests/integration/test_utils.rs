//! Shared test utilities for integration tests
//!
//! `ScriptedModel` stands in for the LLM providers: plans and verdicts are queued,
//! documents are synthesized from the planned path, and every call is recorded so
//! tests can assert on round counts and call order. `with_xdg_env` isolates the
//! user config directory for config-loading tests.

#![allow(dead_code)]

use async_trait::async_trait;
use memoflow::error::{ApiError, GenerationError};
use memoflow::model::{ModelCall, StructuredRequest, TextRequest};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Plan,
    Evaluate,
    Generate,
    Revise,
    Normalize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    pub path: Option<String>,
}

#[derive(Default)]
struct Script {
    plans: VecDeque<Result<Value, GenerationError>>,
    verdicts: HashMap<String, VecDeque<Value>>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    delays: HashMap<String, Duration>,
    revisions: HashMap<String, usize>,
}

#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the reply of the next planning call.
    pub fn push_plan(&self, plan: Value) -> &Self {
        self.script.lock().plans.push_back(Ok(plan));
        self
    }

    pub fn push_plan_error(&self, error: GenerationError) -> &Self {
        self.script.lock().plans.push_back(Err(error));
        self
    }

    /// Queue a verdict for `path`. Unscripted evaluations converge.
    pub fn push_verdict(&self, path: &str, verdict: Value) -> &Self {
        self.script
            .lock()
            .verdicts
            .entry(path.to_string())
            .or_default()
            .push_back(verdict);
        self
    }

    /// Every text call for `path` fails.
    pub fn fail_text_for(&self, path: &str) -> &Self {
        self.script.lock().failing.insert(path.to_string());
        self
    }

    /// Initial generation for `path` never returns.
    pub fn hang_for(&self, path: &str) -> &Self {
        self.script.lock().hanging.insert(path.to_string());
        self
    }

    /// Initial generation for `path` sleeps first.
    pub fn delay_for(&self, path: &str, delay: Duration) -> &Self {
        self.script.lock().delays.insert(path.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, kind: CallKind, path: Option<&str>) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.kind == kind && (path.is_none() || call.path.as_deref() == path))
            .count()
    }

    fn record(&self, kind: CallKind, path: Option<String>) {
        self.calls.lock().push(Call { kind, path });
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let rest = &text[text.find(start)? + start.len()..];
    Some(&rest[..rest.find(end)?])
}

#[async_trait]
impl ModelCall for ScriptedModel {
    async fn structured(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        if request.schema.name == "plan" {
            self.record(CallKind::Plan, None);
            return self
                .script
                .lock()
                .plans
                .pop_front()
                .unwrap_or_else(|| Ok(empty_plan()));
        }

        let path = between(&request.prompt, "planned for ", " (").map(str::to_string);
        self.record(CallKind::Evaluate, path.clone());
        let scripted = path.as_ref().and_then(|path| {
            self.script
                .lock()
                .verdicts
                .get_mut(path)
                .and_then(VecDeque::pop_front)
        });
        Ok(scripted.unwrap_or_else(|| verdict(9.0, true, true, true)))
    }

    async fn text(&self, request: TextRequest) -> Result<String, GenerationError> {
        let prompt = request.prompt;
        let (kind, path) = if prompt.starts_with("Normalize the document below.") {
            (CallKind::Normalize, between(&prompt, "## Document\n\n# ", "\n"))
        } else if prompt.starts_with("Improve the content of ") {
            (CallKind::Revise, between(&prompt, "Improve the content of ", " based"))
        } else {
            (CallKind::Generate, between(&prompt, "Write the full content of ", " ("))
        };
        let path = path.unwrap_or_default().to_string();
        self.record(kind, Some(path.clone()));

        let (failing, hanging, delay) = {
            let script = self.script.lock();
            (
                script.failing.contains(&path),
                script.hanging.contains(&path),
                script.delays.get(&path).copied(),
            )
        };
        if failing {
            return Err(ApiError::ProviderRequestFailed(format!("scripted failure for {}", path)).into());
        }

        match kind {
            CallKind::Generate => {
                if hanging {
                    std::future::pending::<()>().await;
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(format!("# {}\n\ndraft", path))
            }
            CallKind::Revise => {
                let n = {
                    let mut script = self.script.lock();
                    let n = script.revisions.entry(path.clone()).or_insert(0);
                    *n += 1;
                    *n
                };
                Ok(format!("# {}\n\nrevision {}", path, n))
            }
            _ => {
                let document = prompt
                    .split_once("## Document\n\n")
                    .map(|(_, doc)| doc)
                    .unwrap_or_default();
                Ok(format!("{}\n<!-- normalized -->", document))
            }
        }
    }
}

pub fn empty_plan() -> Value {
    json!({"files": [], "estimatedComplexity": "low"})
}

pub fn plan_of(changes: &[(&str, &str)]) -> Value {
    let files: Vec<Value> = changes
        .iter()
        .map(|(path, change_type)| {
            json!({
                "purpose": format!("keep {}", path),
                "filePath": path,
                "changeType": change_type,
            })
        })
        .collect();
    json!({"files": files, "estimatedComplexity": "medium"})
}

pub fn verdict(score: f64, structure_valid: bool, content_clear: bool, purpose_served: bool) -> Value {
    let issues: Vec<&str> = if structure_valid {
        Vec::new()
    } else {
        vec!["structure is off"]
    };
    json!({
        "qualityScore": score,
        "structureValid": structure_valid,
        "contentClear": content_clear,
        "purposeServed": purpose_served,
        "specificIssues": issues,
        "improvementSuggestions": ["tighten the wording"],
    })
}

pub fn unreachable() -> GenerationError {
    ApiError::ProviderUnreachable("connection refused".to_string()).into()
}

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(names: &[&'static str]) -> Self {
        Self {
            vars: names.iter().map(|name| (*name, std::env::var(name).ok())).collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with `HOME` and `XDG_CONFIG_HOME` pointed into `test_dir`, plus any extra
/// variables, restoring the environment afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, extra: &[(&'static str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut names = vec!["HOME", "XDG_CONFIG_HOME"];
    names.extend(extra.iter().map(|(name, _)| *name));
    let env_state = EnvState::capture(&names);

    let test_config_home = test_dir.path().join("config");
    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    for (name, value) in extra {
        std::env::set_var(name, value);
    }

    let result = f();

    env_state.restore();

    result
}
