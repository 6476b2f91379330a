//! Final normalization pass selection.

use serde::{Deserialize, Serialize};

/// How the single post-refinement normalization pass runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerMode {
    /// Restricted model call through the content generator
    #[default]
    Model,
    /// Local cleanup only: strip one wrapping code fence and trim
    Deterministic,
}

/// Remove a single code fence that wraps the whole document, if present.
pub fn strip_wrapping_fence(content: &str) -> String {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed.to_string();
    };
    // The opening line may carry a language tag.
    match body.split_once('\n') {
        Some((tag, inner)) if !tag.contains('`') => inner.trim().to_string(),
        _ => trimmed.to_string(),
    }
}
