//! Workflow data model: inputs, plan, verdicts, and generated files.

use serde::{Deserialize, Serialize};

/// Minimum score for a verdict to count as converged.
pub const QUALITY_THRESHOLD: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "ai", alias = "assistant")]
    Agent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }
}

/// One transcript entry. Also accepts the `{source, message}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "source")]
    pub role: Role,
    #[serde(alias = "message")]
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }
}

/// A stored note, read-only input to the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(alias = "memoId")]
    pub id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Modify,
    Delete,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChange {
    pub purpose: String,
    #[serde(rename = "filePath", alias = "path")]
    pub path: String,
    #[serde(rename = "changeType")]
    pub change_type: ChangeType,
}

impl PlannedChange {
    /// The change used when planning never yields one.
    pub fn fallback() -> Self {
        Self {
            purpose: "capture conversation content".to_string(),
            path: "conversation-memo.md".to_string(),
            change_type: ChangeType::Create,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "files", alias = "changes")]
    pub changes: Vec<PlannedChange>,
    #[serde(rename = "estimatedComplexity")]
    pub estimated_complexity: Complexity,
}

impl Plan {
    pub fn fallback() -> Self {
        Self {
            changes: vec![PlannedChange::fallback()],
            estimated_complexity: Complexity::Low,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// One quality-rubric judgment of a candidate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityVerdict {
    #[serde(rename = "qualityScore")]
    pub score: f64,
    #[serde(rename = "structureValid")]
    pub structure_valid: bool,
    #[serde(rename = "contentClear")]
    pub content_clear: bool,
    #[serde(rename = "purposeServed")]
    pub purpose_served: bool,
    #[serde(rename = "specificIssues", default)]
    pub issues: Vec<String>,
    #[serde(rename = "improvementSuggestions", default)]
    pub suggestions: Vec<String>,
}

impl QualityVerdict {
    /// Every rubric predicate must hold; a high score alone is not enough.
    pub fn converged(&self) -> bool {
        self.score >= QUALITY_THRESHOLD
            && self.structure_valid
            && self.content_clear
            && self.purpose_served
    }

    /// Issues followed by suggestions, as revision feedback.
    pub fn feedback(&self) -> Vec<String> {
        self.issues
            .iter()
            .chain(self.suggestions.iter())
            .cloned()
            .collect()
    }
}

/// Terminal artifact handed back to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            path,
            name,
            content: content.into(),
        }
    }
}

/// Workflow output. An empty `files` list on a run that was not cancelled means no
/// changes are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub files: Vec<GeneratedFile>,
    /// Stopped by cancellation or timeout before every planned file finished
    #[serde(default)]
    pub cancelled: bool,
}

impl WorkflowResult {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn summary(&self) -> &'static str {
        if self.cancelled {
            "Run stopped before completion"
        } else if self.is_empty() {
            "No changes required"
        } else {
            "Successfully generated memos"
        }
    }
}
